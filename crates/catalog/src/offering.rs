use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use dailyround_core::{
    CalendarDate, CategoryId, Entity, ImageId, OfferingGid, OwnerId, VariantId,
};

use crate::schedule::{PriceEntry, PriceSchedule, PricingMode};
use crate::slots::{TimeSlot, decode_slots, encode_slots};
use crate::validation::PriceDraft;

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// What kind of thing an offering (or category) is.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferingKind {
    #[default]
    Goods,
    Services,
    Utilities,
}

/// Sub-choice of an offering (e.g. a pack size).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub vid: VariantId,
    pub name: String,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub crate_label: Option<String>,
    #[serde(default)]
    pub crate_capacity: u32,
    #[serde(default)]
    pub is_public: bool,
    /// Always equals the variant's position in its offering.
    #[serde(default)]
    pub sequence: u32,
}

impl Variant {
    pub fn new(vid: VariantId, name: impl Into<String>) -> Self {
        Self {
            vid,
            name: name.into(),
            barcode: None,
            crate_label: None,
            crate_capacity: 0,
            is_public: false,
            sequence: 0,
        }
    }
}

impl Entity for Variant {
    type Id = VariantId;

    fn id(&self) -> &Self::Id {
        &self.vid
    }
}

/// Supply-chain linkage. Opaque to pricing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub source_id: String,
    #[serde(default)]
    pub supplier_name: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
}

/// Read-mostly grouping reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: OfferingKind,
    #[serde(default)]
    pub sub_type: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub image_id: Option<ImageId>,
    #[serde(default)]
    pub sequence: u32,
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A sellable catalog entry.
///
/// Every optional field defaults through `#[serde(default)]` or
/// [`Offering::new`]; there is no other place where absent values get mapped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offering {
    gid: OfferingGid,
    pub owner_id: OwnerId,
    pub name: String,
    #[serde(default)]
    pub kind: OfferingKind,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub unit_label: Option<String>,
    #[serde(default)]
    pub crate_label: Option<String>,
    #[serde(default)]
    pub crate_capacity: u32,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub supplier_defined_category: Option<String>,
    #[serde(default)]
    pub available_slots: Option<String>,
    #[serde(default)]
    pub start_date: CalendarDate,
    #[serde(default)]
    pub end_date: CalendarDate,
    #[serde(default)]
    pub pricing_mode: PricingMode,
    /// Editor toggle: when set, at least one variant is required.
    #[serde(default)]
    pub has_variants: bool,
    #[serde(default)]
    variants: Vec<Variant>,
    #[serde(default)]
    pub prices: PriceSchedule,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub image_ids: Vec<ImageId>,
}

impl Offering {
    pub fn new(gid: OfferingGid, owner_id: OwnerId, name: impl Into<String>) -> Self {
        Self {
            gid,
            owner_id,
            name: name.into(),
            kind: OfferingKind::Goods,
            short_name: None,
            description: None,
            barcode: None,
            unit_label: None,
            crate_label: None,
            crate_capacity: 0,
            is_public: false,
            category: None,
            supplier_defined_category: None,
            available_slots: None,
            start_date: CalendarDate::UNSET,
            end_date: CalendarDate::UNSET,
            pricing_mode: PricingMode::Flat,
            has_variants: false,
            variants: Vec::new(),
            prices: PriceSchedule::new(),
            sources: Vec::new(),
            image_ids: Vec::new(),
        }
    }

    pub fn gid(&self) -> &OfferingGid {
        &self.gid
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn variant(&self, vid: &VariantId) -> Option<&Variant> {
        self.variants.iter().find(|v| v.id() == vid)
    }

    /// Grouping key: supplier-defined category, else category. Blank values
    /// count as absent.
    pub fn category_key(&self) -> Option<&str> {
        non_blank(&self.supplier_defined_category).or_else(|| non_blank(&self.category))
    }

    // --- variants -------------------------------------------------------

    fn renumber_variants(&mut self) {
        for (idx, variant) in self.variants.iter_mut().enumerate() {
            variant.sequence = idx as u32;
        }
    }

    pub fn add_variant(&mut self, variant: Variant) {
        self.variants.push(variant);
        self.renumber_variants();
    }

    /// Insert at `index` (clamped to the end).
    pub fn insert_variant(&mut self, index: usize, variant: Variant) {
        let index = index.min(self.variants.len());
        self.variants.insert(index, variant);
        self.renumber_variants();
    }

    /// Remove the variant at `index` together with its variant-specific prices.
    pub fn remove_variant(&mut self, index: usize) -> Option<Variant> {
        if index >= self.variants.len() {
            return None;
        }
        let removed = self.variants.remove(index);
        self.prices.remove_variant(&removed.vid);
        self.renumber_variants();
        Some(removed)
    }

    /// Move a variant to a new position. Returns `false` if `from` is out of range.
    pub fn move_variant(&mut self, from: usize, to: usize) -> bool {
        if from >= self.variants.len() {
            return false;
        }
        let variant = self.variants.remove(from);
        let to = to.min(self.variants.len());
        self.variants.insert(to, variant);
        self.renumber_variants();
        true
    }

    /// Replace every variant at once (e.g. from an editor), re-numbering them.
    pub fn set_variants(&mut self, variants: Vec<Variant>) {
        self.variants = variants;
        self.renumber_variants();
    }

    // --- pricing --------------------------------------------------------

    /// The price entry in effect on `as_of`, if any.
    pub fn resolve_price(&self, as_of: CalendarDate, variant_id: Option<&VariantId>) -> Option<&PriceEntry> {
        self.prices.resolve(as_of, variant_id)
    }

    /// Fold the editor's draft into the schedule as the entry effective from
    /// `applicable_date`, replacing an entry for the same variant and day.
    pub fn apply_price_draft(
        &mut self,
        draft: PriceDraft,
        applicable_date: CalendarDate,
        variant_id: Option<VariantId>,
    ) {
        self.pricing_mode = draft.pricing_mode;
        self.prices.upsert(draft.into_entry(applicable_date, variant_id));
    }

    /// Sell price charged for a delivery on `date`, honouring day-wise overrides.
    pub fn sell_price_on(&self, date: CalendarDate, variant_id: Option<&VariantId>) -> Option<f64> {
        self.resolve_price(date, variant_id)
            .map(|entry| entry.effective_sell_price(date, self.pricing_mode))
    }

    // --- availability ---------------------------------------------------

    pub fn slots(&self) -> BTreeSet<TimeSlot> {
        self.available_slots
            .as_deref()
            .map(decode_slots)
            .unwrap_or_default()
    }

    pub fn set_slots<'a>(&mut self, slots: impl IntoIterator<Item = &'a TimeSlot>) {
        let encoded = encode_slots(slots);
        self.available_slots = (!encoded.is_empty()).then_some(encoded);
    }

    pub fn supports_slot(&self, slot: TimeSlot) -> bool {
        self.slots().contains(&slot)
    }

    /// Inside the start/end window; an unset bound is open.
    pub fn is_available_on(&self, date: CalendarDate) -> bool {
        (!self.start_date.is_set() || self.start_date <= date)
            && (!self.end_date.is_set() || date <= self.end_date)
    }

    // --- images ---------------------------------------------------------

    /// Append already-resolved image ids, skipping ones already attached.
    pub fn attach_images(&mut self, ids: impl IntoIterator<Item = ImageId>) {
        for id in ids {
            if !self.image_ids.contains(&id) {
                self.image_ids.push(id);
            }
        }
    }

    /// Copy every mutable field from `edited`, keeping identity and ownership.
    pub fn merge_from(&mut self, edited: &Offering) {
        let gid = self.gid.clone();
        let owner_id = self.owner_id;
        *self = edited.clone();
        self.gid = gid;
        self.owner_id = owner_id;
        self.renumber_variants();
    }
}

impl Entity for Offering {
    type Id = OfferingGid;

    fn id(&self) -> &Self::Id {
        &self.gid
    }
}
