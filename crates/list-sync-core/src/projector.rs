//! View Projector
//!
//! Pure function from a cache snapshot to the grouped, ordered list the UI
//! renders. Archived items never make it into the output.

use crate::item::{Item, ItemState};

/// One rendered section: a category and its visible items in order
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGroup {
    pub category: String,
    pub items: Vec<Item>,
}

/// Projection of one cache revision. Two projections of the same
/// reconciler are equal exactly when their revisions are, so a reactive
/// memo over it only notifies when the cache actually changed.
#[derive(Debug, Clone, Default)]
pub struct Projection {
    pub revision: u64,
    pub groups: Vec<CategoryGroup>,
}

impl PartialEq for Projection {
    fn eq(&self, other: &Self) -> bool {
        self.revision == other.revision
    }
}

/// Group and order visible items.
///
/// Precedence: category position in `categories` (unknown categories after
/// all known ones, alphabetically), then active before checked, then oldest
/// first, then id.
pub fn project<'a>(items: impl IntoIterator<Item = &'a Item>, categories: &[String]) -> Vec<CategoryGroup> {
    let category_rank = |category: &str| {
        categories
            .iter()
            .position(|c| c == category)
            .unwrap_or(categories.len())
    };

    let mut visible: Vec<&Item> = items
        .into_iter()
        .filter(|item| item.state != ItemState::Archived)
        .collect();

    visible.sort_by(|a, b| {
        category_rank(&a.category)
            .cmp(&category_rank(&b.category))
            .then_with(|| a.category.cmp(&b.category))
            .then_with(|| a.state.sort_rank().cmp(&b.state.sort_rank()))
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut groups: Vec<CategoryGroup> = Vec::new();
    for item in visible {
        match groups.last_mut() {
            Some(group) if group.category == item.category => {
                group.items.push(item.clone());
            }
            _ => groups.push(CategoryGroup {
                category: item.category.clone(),
                items: vec![item.clone()],
            }),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheEvent, Reconciler};
    use crate::config::ClientConfig;
    use crate::item::tests::make_item;

    fn categories() -> Vec<String> {
        ClientConfig::default().categories
    }

    fn names(groups: &[CategoryGroup]) -> Vec<(String, Vec<String>)> {
        groups
            .iter()
            .map(|g| (g.category.clone(), g.items.iter().map(|i| i.name.clone()).collect()))
            .collect()
    }

    #[test]
    fn test_grouping_and_ordering() {
        let items = vec![
            make_item("1", "Soap", "Household", ItemState::Active, 1),
            make_item("2", "Butter", "Dairy", ItemState::Checked, 0),
            make_item("3", "Milk", "Dairy", ItemState::Active, 5),
            make_item("4", "Cheese", "Dairy", ItemState::Active, 2),
            make_item("5", "Apples", "Produce", ItemState::Checked, 3),
            make_item("6", "Candles", "Other", ItemState::Active, 0),
        ];
        let groups = project(&items, &categories());
        assert_eq!(
            names(&groups),
            vec![
                ("Produce".into(), vec!["Apples".into()]),
                ("Dairy".into(), vec!["Cheese".into(), "Milk".into(), "Butter".into()]),
                ("Household".into(), vec!["Soap".into()]),
                ("Other".into(), vec!["Candles".into()]),
            ]
        );
    }

    #[test]
    fn test_archived_never_projected() {
        let mut reconciler = Reconciler::new();
        reconciler.apply(CacheEvent::Created(make_item("1", "Milk", "Dairy", ItemState::Archived, 0)));
        reconciler.apply(CacheEvent::Created(make_item("2", "Eggs", "Dairy", ItemState::Active, 1)));
        let mut archived_later = make_item("2", "Eggs", "Dairy", ItemState::Archived, 1);
        archived_later.updated_at = archived_later.updated_at + chrono::TimeDelta::seconds(30);
        reconciler.apply(CacheEvent::Updated(archived_later));

        let groups = project(reconciler.items(), &categories());
        assert!(groups.is_empty());
    }

    #[test]
    fn test_projection_changes_only_with_revision() {
        let mut reconciler = Reconciler::new();
        reconciler.apply(CacheEvent::Created(make_item("1", "Milk", "Dairy", ItemState::Active, 0)));
        let first = reconciler.project(&categories());

        // echo of an already cached item: nothing to re-render
        reconciler.apply(CacheEvent::Created(make_item("1", "Milk", "Dairy", ItemState::Active, 0)));
        assert_eq!(reconciler.project(&categories()), first);

        reconciler.apply(CacheEvent::Created(make_item("2", "Eggs", "Dairy", ItemState::Active, 1)));
        let second = reconciler.project(&categories());
        assert_ne!(second, first);
        assert_eq!(names(&second.groups), vec![("Dairy".into(), vec!["Milk".into(), "Eggs".into()])]);
    }

    #[test]
    fn test_unknown_categories_sort_last() {
        let items = vec![
            make_item("1", "Nails", "Hardware", ItemState::Active, 0),
            make_item("2", "Tape", "Crafts", ItemState::Active, 0),
            make_item("3", "Candles", "Other", ItemState::Active, 0),
        ];
        let groups = project(&items, &categories());
        let order: Vec<_> = groups.iter().map(|g| g.category.as_str()).collect();
        assert_eq!(order, vec!["Other", "Crafts", "Hardware"]);
    }

    #[test]
    fn test_tie_break_by_id_is_deterministic() {
        let a = make_item("b", "Second", "Dairy", ItemState::Active, 0);
        let b = make_item("a", "First", "Dairy", ItemState::Active, 0);
        let forward = project(&[a.clone(), b.clone()], &categories());
        let backward = project(&[b, a], &categories());
        assert_eq!(forward, backward);
        assert_eq!(forward[0].items[0].name, "First");
    }

    #[test]
    fn test_ordering_invariant_holds() {
        let mut items = Vec::new();
        let cats = ["Dairy", "Produce", "Mystery", "Other", "Bakery"];
        for n in 0..40i64 {
            let state = match n % 3 {
                0 => ItemState::Active,
                1 => ItemState::Checked,
                _ => ItemState::Archived,
            };
            items.push(make_item(&format!("{:02}", n), "x", cats[(n % 5) as usize], state, (n * 7) % 11));
        }
        let cats = categories();
        let groups = project(&items, &cats);
        let rank = |c: &str| cats.iter().position(|k| k == c).unwrap_or(cats.len());
        for pair in groups.windows(2) {
            assert!(rank(&pair[0].category) <= rank(&pair[1].category));
        }
        for group in &groups {
            assert!(!group.items.is_empty());
            for pair in group.items.windows(2) {
                let (x, y) = (&pair[0], &pair[1]);
                assert_ne!(x.state, ItemState::Archived);
                assert!(x.state.sort_rank() <= y.state.sort_rank());
                if x.state == y.state {
                    assert!(x.created_at <= y.created_at);
                }
            }
        }
    }

    #[test]
    fn test_projection_is_pure() {
        let mut reconciler = Reconciler::new();
        reconciler.apply(CacheEvent::Created(make_item("1", "Milk", "Dairy", ItemState::Active, 0)));
        let before = reconciler.clone();
        let first = project(reconciler.items(), &categories());
        let second = project(reconciler.items(), &categories());
        assert_eq!(first, second);
        assert_eq!(reconciler, before);
    }
}
