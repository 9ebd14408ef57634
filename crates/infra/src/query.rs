//! Text search, structured filters and category grouping over catalog snapshots.
//!
//! Everything here is a pure function of the offerings passed in; the facade
//! hands in a point-in-time snapshot of its mirror.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use dailyround_catalog::Offering;
use dailyround_core::CalendarDate;

/// Display name of the bucket holding offerings without a category.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Inclusive date window; an unset bound is open.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: CalendarDate,
    pub end: CalendarDate,
}

impl DateWindow {
    pub fn new(start: CalendarDate, end: CalendarDate) -> Self {
        Self { start, end }
    }

    /// Two windows overlap unless one ends before the other starts. Open
    /// bounds never cause a miss, so an offering without any window matches
    /// every requested window.
    pub fn overlaps(&self, other: &DateWindow) -> bool {
        let starts_before_other_ends =
            !self.start.is_set() || !other.end.is_set() || self.start <= other.end;
        let ends_after_other_starts =
            !self.end.is_set() || !other.start.is_set() || other.start <= self.end;
        starts_before_other_ends && ends_after_other_starts
    }
}

/// Structured filter predicate. Every unset field matches everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OfferingFilter {
    /// Exact match against `Offering::category`.
    pub category: Option<String>,
    /// Exact match against `Offering::supplier_defined_category`.
    pub supplier_defined_category: Option<String>,
    pub public_only: bool,
    pub has_variants_only: bool,
    pub window: Option<DateWindow>,
}

impl OfferingFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn supplier_defined_category(mut self, category: impl Into<String>) -> Self {
        self.supplier_defined_category = Some(category.into());
        self
    }

    pub fn public_only(mut self) -> Self {
        self.public_only = true;
        self
    }

    pub fn has_variants_only(mut self) -> Self {
        self.has_variants_only = true;
        self
    }

    pub fn window(mut self, start: CalendarDate, end: CalendarDate) -> Self {
        self.window = Some(DateWindow::new(start, end));
        self
    }

    pub fn matches(&self, offering: &Offering) -> bool {
        if let Some(category) = &self.category {
            if offering.category.as_deref() != Some(category.as_str()) {
                return false;
            }
        }
        if let Some(category) = &self.supplier_defined_category {
            if offering.supplier_defined_category.as_deref() != Some(category.as_str()) {
                return false;
            }
        }
        if self.public_only && !offering.is_public {
            return false;
        }
        if self.has_variants_only && offering.variants().is_empty() {
            return false;
        }
        if let Some(window) = &self.window {
            let own = DateWindow::new(offering.start_date, offering.end_date);
            if !own.overlaps(window) {
                return false;
            }
        }
        true
    }
}

/// Case-insensitive substring match on name and description. Blank text matches all.
pub fn matches_text(offering: &Offering, text: &str) -> bool {
    let needle = text.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    offering.name.to_lowercase().contains(&needle)
        || offering
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(&needle))
}

pub fn search<'a>(offerings: &'a [Offering], text: &str) -> Vec<&'a Offering> {
    offerings.iter().filter(|o| matches_text(o, text)).collect()
}

pub fn apply_filter<'a>(offerings: &'a [Offering], filter: &OfferingFilter) -> Vec<&'a Offering> {
    offerings.iter().filter(|o| filter.matches(o)).collect()
}

/// Grouping key. Named buckets sort by name; the uncategorized bucket always
/// sorts last.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GroupKey {
    Named(String),
    Uncategorized,
}

impl GroupKey {
    pub fn of(offering: &Offering) -> Self {
        Self::of_with(offering, UNCATEGORIZED)
    }

    /// A category spelled exactly like the uncategorized label lands in the
    /// uncategorized bucket, so a listing never shows two headers with that label.
    pub fn of_with(offering: &Offering, uncategorized_label: &str) -> Self {
        match offering.category_key() {
            Some(key) if key != uncategorized_label => GroupKey::Named(key.to_string()),
            _ => GroupKey::Uncategorized,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            GroupKey::Named(name) => name,
            GroupKey::Uncategorized => UNCATEGORIZED,
        }
    }
}

/// One category bucket, offerings sorted by name then gid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub key: GroupKey,
    pub offerings: Vec<Offering>,
}

fn name_then_gid(a: &Offering, b: &Offering) -> std::cmp::Ordering {
    a.name.cmp(&b.name).then_with(|| a.gid().cmp(b.gid()))
}

pub fn group_by_category<'a>(offerings: impl IntoIterator<Item = &'a Offering>) -> Vec<CategoryGroup> {
    group_by_category_with(offerings, UNCATEGORIZED)
}

pub fn group_by_category_with<'a>(
    offerings: impl IntoIterator<Item = &'a Offering>,
    uncategorized_label: &str,
) -> Vec<CategoryGroup> {
    let mut buckets: BTreeMap<GroupKey, Vec<Offering>> = BTreeMap::new();
    for offering in offerings {
        buckets
            .entry(GroupKey::of_with(offering, uncategorized_label))
            .or_default()
            .push(offering.clone());
    }
    buckets
        .into_iter()
        .map(|(key, mut offerings)| {
            offerings.sort_by(name_then_gid);
            CategoryGroup { key, offerings }
        })
        .collect()
}

/// Row of a grouped catalog listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OfferingListItem {
    Header { key: GroupKey, label: String, count: usize },
    Offering(Offering),
}

/// Search, filter and group in one pass, flattened for display.
pub fn list_offerings<'a>(
    offerings: impl IntoIterator<Item = &'a Offering>,
    filter: &OfferingFilter,
    search_text: &str,
    uncategorized_label: &str,
) -> Vec<OfferingListItem> {
    let selected = offerings
        .into_iter()
        .filter(|o| filter.matches(o) && matches_text(o, search_text));

    let mut items = Vec::new();
    for group in group_by_category_with(selected, uncategorized_label) {
        let label = match &group.key {
            GroupKey::Named(name) => name.clone(),
            GroupKey::Uncategorized => uncategorized_label.to_string(),
        };
        items.push(OfferingListItem::Header {
            key: group.key,
            label,
            count: group.offerings.len(),
        });
        items.extend(group.offerings.into_iter().map(OfferingListItem::Offering));
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use dailyround_catalog::Variant;
    use dailyround_core::{OfferingGid, OwnerId, VariantId};

    fn offering(gid: &str, name: &str, category: Option<&str>) -> Offering {
        let mut o = Offering::new(OfferingGid::parse(gid).unwrap(), OwnerId::new(), name);
        o.category = category.map(str::to_string);
        o
    }

    fn names(group: &CategoryGroup) -> Vec<&str> {
        group.offerings.iter().map(|o| o.name.as_str()).collect()
    }

    fn d(raw: u32) -> CalendarDate {
        CalendarDate::from_raw(raw)
    }

    #[test]
    fn groups_by_category_with_sorted_buckets() {
        let offerings = vec![
            offering("1", "B", Some("X")),
            offering("2", "A", Some("X")),
            offering("3", "C", None),
        ];
        let groups = group_by_category(&offerings);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, GroupKey::Named("X".into()));
        assert_eq!(names(&groups[0]), vec!["A", "B"]);
        assert_eq!(groups[1].key, GroupKey::Uncategorized);
        assert_eq!(groups[1].key.label(), "Uncategorized");
        assert_eq!(names(&groups[1]), vec!["C"]);
    }

    #[test]
    fn supplier_defined_category_wins_for_grouping() {
        let mut o = offering("1", "Paneer", Some("dairy"));
        o.supplier_defined_category = Some("Fresh".into());
        let groups = group_by_category([&o]);
        assert_eq!(groups[0].key, GroupKey::Named("Fresh".into()));
    }

    #[test]
    fn name_ties_are_broken_by_gid() {
        let offerings = vec![
            offering("z", "Milk", Some("X")),
            offering("a", "Milk", Some("X")),
        ];
        let groups = group_by_category(&offerings);
        let gids: Vec<_> = groups[0].offerings.iter().map(|o| o.gid().as_str()).collect();
        assert_eq!(gids, vec!["a", "z"]);
    }

    #[test]
    fn search_is_case_insensitive_over_name_and_description() {
        let mut curd = offering("1", "Curd", None);
        curd.description = Some("Thick set MILK curd".into());
        let offerings = vec![offering("2", "Whole Milk", None), curd, offering("3", "Bread", None)];

        assert_eq!(search(&offerings, "milk").len(), 2);
        assert_eq!(search(&offerings, "BREAD").len(), 1);
        assert_eq!(search(&offerings, "  ").len(), 3);
        assert_eq!(search(&offerings, "").len(), 3);
    }

    #[test]
    fn filter_by_flags_and_categories() {
        let mut public = offering("1", "A", Some("dairy"));
        public.is_public = true;
        let mut with_variant = offering("2", "B", Some("bakery"));
        with_variant.add_variant(Variant::new(VariantId::parse("v").unwrap(), "Small"));
        let mut supplier = offering("3", "C", None);
        supplier.supplier_defined_category = Some("Farm".into());
        let offerings = vec![public, with_variant, supplier];

        assert_eq!(apply_filter(&offerings, &OfferingFilter::new()).len(), 3);
        assert_eq!(apply_filter(&offerings, &OfferingFilter::new().public_only()).len(), 1);
        assert_eq!(apply_filter(&offerings, &OfferingFilter::new().has_variants_only()).len(), 1);
        assert_eq!(apply_filter(&offerings, &OfferingFilter::new().category("dairy")).len(), 1);
        assert_eq!(
            apply_filter(&offerings, &OfferingFilter::new().supplier_defined_category("Farm")).len(),
            1
        );
        assert!(apply_filter(&offerings, &OfferingFilter::new().category("dairy").public_only().has_variants_only()).is_empty());
    }

    #[test]
    fn date_window_intersection() {
        let mut summer = offering("1", "Mango", None);
        summer.start_date = d(20240401);
        summer.end_date = d(20240630);
        let mut from_june = offering("2", "Lassi", None);
        from_june.start_date = d(20240601);
        let always = offering("3", "Milk", None);
        let offerings = vec![summer, from_june, always];

        let may = OfferingFilter::new().window(d(20240501), d(20240531));
        let names = |f: &OfferingFilter| {
            apply_filter(&offerings, f).iter().map(|o| o.name.clone()).collect::<Vec<_>>()
        };
        assert_eq!(names(&may), vec!["Mango", "Milk"]);

        let july_onwards = OfferingFilter::new().window(d(20240701), CalendarDate::UNSET);
        assert_eq!(names(&july_onwards), vec!["Lassi", "Milk"]);

        let touching = OfferingFilter::new().window(d(20240630), d(20240630));
        assert_eq!(names(&touching), vec!["Mango", "Lassi", "Milk"]);
    }

    #[test]
    fn list_offerings_emits_headers_before_members() {
        let mut hidden = offering("4", "Hidden", Some("X"));
        hidden.is_public = false;
        let mut offerings = vec![
            offering("1", "B", Some("X")),
            offering("2", "A", Some("X")),
            offering("3", "C", None),
            hidden,
        ];
        for o in offerings.iter_mut().take(3) {
            o.is_public = true;
        }

        let items = list_offerings(&offerings, &OfferingFilter::new().public_only(), "", "Other");
        let rendered: Vec<String> = items
            .iter()
            .map(|item| match item {
                OfferingListItem::Header { label, count, .. } => format!("# {label} ({count})"),
                OfferingListItem::Offering(o) => o.name.clone(),
            })
            .collect();
        assert_eq!(rendered, vec!["# X (2)", "A", "B", "# Other (1)", "C"]);
    }

    #[test]
    fn category_named_like_the_uncategorized_label_shares_its_bucket() {
        let offerings = vec![
            offering("1", "Milk", None),
            offering("2", "Bread", Some("Uncategorized")),
            offering("3", "Curd", Some("Other")),
            offering("4", "Jam", Some("Dairy")),
        ];

        let groups = group_by_category(&offerings);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[2].key, GroupKey::Uncategorized);
        assert_eq!(names(&groups[2]), vec!["Bread", "Milk"]);

        let items = list_offerings(&offerings, &OfferingFilter::new(), "", "Other");
        let headers: Vec<String> = items
            .iter()
            .filter_map(|item| match item {
                OfferingListItem::Header { label, count, .. } => Some(format!("{label} ({count})")),
                OfferingListItem::Offering(_) => None,
            })
            .collect();
        assert_eq!(headers, vec!["Dairy (1)", "Uncategorized (1)", "Other (2)"]);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn catalog() -> impl Strategy<Value = Vec<Offering>> {
            let category = prop::option::of(prop::sample::select(vec!["Dairy", "Bakery", " ", "Fruit", UNCATEGORIZED]));
            prop::collection::vec(("[a-d]{1,3}", category), 0..40).prop_map(|rows| {
                rows.into_iter()
                    .enumerate()
                    .map(|(i, (name, category))| offering(&format!("g{i:03}"), &name, category))
                    .collect()
            })
        }

        proptest! {
            /// Property: grouping partitions the input; uncategorized is last and
            /// every bucket is sorted by name then gid.
            #[test]
            fn grouping_partitions_and_orders(offerings in catalog()) {
                let groups = group_by_category(&offerings);

                let total: usize = groups.iter().map(|g| g.offerings.len()).sum();
                prop_assert_eq!(total, offerings.len());

                let keys: Vec<_> = groups.iter().map(|g| g.key.clone()).collect();
                let mut sorted = keys.clone();
                sorted.sort();
                sorted.dedup();
                prop_assert_eq!(&keys, &sorted);
                if let Some(pos) = keys.iter().position(|k| *k == GroupKey::Uncategorized) {
                    prop_assert_eq!(pos, keys.len() - 1);
                }

                for group in &groups {
                    prop_assert!(!group.offerings.is_empty());
                    for o in &group.offerings {
                        prop_assert_eq!(GroupKey::of(o), group.key.clone());
                    }
                    for pair in group.offerings.windows(2) {
                        prop_assert_ne!(name_then_gid(&pair[0], &pair[1]), std::cmp::Ordering::Greater);
                    }
                }
            }

            /// Property: a listing has one header per non-empty bucket and its
            /// counts match the rows that follow.
            #[test]
            fn listing_headers_count_their_rows(offerings in catalog(), text in "[a-d]{0,2}") {
                let items = list_offerings(&offerings, &OfferingFilter::new(), &text, UNCATEGORIZED);
                let mut expected = None;
                let mut seen = 0;
                for item in &items {
                    match item {
                        OfferingListItem::Header { count, .. } => {
                            if let Some(expected) = expected {
                                prop_assert_eq!(seen, expected);
                            }
                            prop_assert!(*count > 0);
                            expected = Some(*count);
                            seen = 0;
                        }
                        OfferingListItem::Offering(o) => {
                            prop_assert!(expected.is_some());
                            prop_assert!(matches_text(o, &text));
                            seen += 1;
                        }
                    }
                }
                if let Some(expected) = expected {
                    prop_assert_eq!(seen, expected);
                }
            }
        }
    }
}
