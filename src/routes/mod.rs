use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer};
use crate::handlers::{
    blog, contact, events, health_check, installments, products, transactions, users,
};
use crate::AppState;

pub fn create_routes(state: AppState) -> Router {
    let api = Router::new()
        .route("/contact", post(contact::submit))
        // events & ticket zones
        .route("/events", get(events::list).post(events::create))
        .route(
            "/events/:id",
            get(events::get).put(events::update).delete(events::remove),
        )
        .route("/events/:id/zones", post(events::create_zone))
        // profile
        .route("/me", get(users::me).put(users::update_me))
        .route("/me/transactions", get(transactions::my_transactions))
        // ticket purchases
        .route("/transactions", post(transactions::create))
        .route("/transactions/:id", get(transactions::get))
        .route(
            "/transactions/:id/installments",
            get(installments::list_for_transaction),
        )
        .route(
            "/transactions/:id/tickets/:ticket_id/nominate",
            post(transactions::nominate),
        )
        .route(
            "/transactions/:id/tickets/:ticket_id/download",
            get(transactions::download),
        )
        .route("/installments/:id/proof", post(installments::attach_proof))
        // store
        .route("/products", get(products::list).post(products::create))
        .route(
            "/products/:id",
            get(products::get)
                .put(products::update)
                .delete(products::remove),
        )
        .route("/products/:id/variants", post(products::create_variant))
        .route(
            "/products/:id/reviews",
            get(products::list_reviews).post(products::create_review),
        )
        .route(
            "/categories",
            get(products::categories).post(products::create_category),
        )
        .route("/categories/:id", delete(products::delete_category))
        // blog
        .route("/blog", get(blog::list).post(blog::create))
        .route("/blog/:slug", get(blog::get_by_slug))
        .route(
            "/blog/:slug/comments",
            get(blog::list_comments).post(blog::create_comment),
        )
        // admin
        .route("/admin/transactions", get(transactions::admin_list))
        .route("/admin/transactions/courtesy", post(transactions::courtesy))
        .route(
            "/admin/transactions/:id/approve",
            post(transactions::approve),
        )
        .route("/admin/transactions/:id/reject", post(transactions::reject))
        .route("/admin/tickets/:ticket_id/pdf", post(transactions::set_pdf))
        .route(
            "/admin/installments/sweep-overdue",
            post(installments::sweep_overdue),
        )
        .route("/admin/installments/:id/approve", post(installments::approve))
        .route("/admin/installments/:id/reject", post(installments::reject))
        .route("/admin/blog/:id", put(blog::update).delete(blog::remove))
        .route("/admin/comments/:id", delete(blog::delete_comment))
        .route("/admin/reviews/:id", delete(products::delete_review))
        .route("/admin/users", get(users::admin_list))
        .route("/admin/users/:id/role", put(users::set_role));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(create_security_headers_layer(&state.settings))
        .layer(create_cors_layer(&state.settings))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use sqlx::postgres::PgPoolOptions;

    use super::*;
    use crate::config::Settings;

    #[tokio::test]
    async fn router_assembles_without_conflicts() {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/entrada_test")
            .expect("lazy pool");

        let settings = Settings {
            database_url: "postgres://localhost/entrada_test".into(),
            port: 0,
            max_connections: 1,
            cors_allowed_origins: vec!["http://localhost:3000".into()],
            production: false,
            storage_public_base_url: "https://storage.entrada.example/".into(),
            ticket_download_delay_days: 3,
        };

        // panics here mean overlapping route definitions
        let _router = create_routes(AppState {
            pool,
            settings: Arc::new(settings),
        });
    }
}
