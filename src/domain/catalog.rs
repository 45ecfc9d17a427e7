use std::collections::HashMap;

use uuid::Uuid;

use crate::models::product::{CategoryNode, ProductCategory};

/// Assemble the flat category rows into the navigation tree. Roots are the
/// categories without a parent; children are sorted by name at every level.
pub fn build_category_tree(categories: Vec<ProductCategory>) -> Vec<CategoryNode> {
    let mut by_parent: HashMap<Option<Uuid>, Vec<ProductCategory>> = HashMap::new();
    for category in categories {
        by_parent.entry(category.parent_id).or_default().push(category);
    }

    attach(None, &mut by_parent)
}

fn attach(
    parent: Option<Uuid>,
    by_parent: &mut HashMap<Option<Uuid>, Vec<ProductCategory>>,
) -> Vec<CategoryNode> {
    let mut level = by_parent.remove(&parent).unwrap_or_default();
    level.sort_by(|a, b| a.name.cmp(&b.name));

    level
        .into_iter()
        .map(|category| {
            let children = attach(Some(category.id), by_parent);
            CategoryNode { category, children }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn category(name: &str, parent_id: Option<Uuid>) -> ProductCategory {
        let now = Utc::now();
        ProductCategory {
            id: Uuid::new_v4(),
            name: name.to_string(),
            slug: name.to_lowercase(),
            parent_id,
            image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn builds_two_level_tree() {
        let apparel = category("Apparel", None);
        let shirts = category("Shirts", Some(apparel.id));
        let hats = category("Hats", Some(apparel.id));
        let music = category("Music", None);

        let tree = build_category_tree(vec![shirts, music, apparel.clone(), hats]);

        assert_eq!(tree.len(), 2);
        // sorted alphabetically
        assert_eq!(tree[0].category.name, "Apparel");
        assert_eq!(tree[1].category.name, "Music");

        let children: Vec<&str> = tree[0]
            .children
            .iter()
            .map(|c| c.category.name.as_str())
            .collect();
        assert_eq!(children, vec!["Hats", "Shirts"]);
    }

    #[test]
    fn empty_input_gives_empty_tree() {
        assert!(build_category_tree(vec![]).is_empty());
    }

    #[test]
    fn grandchildren_nest() {
        let root = category("Store", None);
        let mid = category("Apparel", Some(root.id));
        let leaf = category("Shirts", Some(mid.id));

        let tree = build_category_tree(vec![leaf, mid, root]);

        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].children.len(), 1);
        assert_eq!(tree[0].children[0].children[0].category.name, "Shirts");
    }
}
