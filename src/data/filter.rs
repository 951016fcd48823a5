use std::fmt;

use serde::Serialize;

use super::model::{Dataset, Habitat};

// ---------------------------------------------------------------------------
// Habitat selector
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum HabitatFilter {
    #[default]
    Both,
    Forest,
    Grassland,
}

impl HabitatFilter {
    pub const ALL: [HabitatFilter; 3] = [
        HabitatFilter::Both,
        HabitatFilter::Forest,
        HabitatFilter::Grassland,
    ];

    pub fn label(self) -> &'static str {
        match self {
            HabitatFilter::Both => "Both",
            HabitatFilter::Forest => Habitat::Forest.label(),
            HabitatFilter::Grassland => Habitat::Grassland.label(),
        }
    }

    pub fn matches(self, habitat: Habitat) -> bool {
        match self {
            HabitatFilter::Both => true,
            HabitatFilter::Forest => habitat == Habitat::Forest,
            HabitatFilter::Grassland => habitat == Habitat::Grassland,
        }
    }
}

impl fmt::Display for HabitatFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Year range
// ---------------------------------------------------------------------------

/// Inclusive year interval with `lo <= hi`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearRange {
    pub lo: i32,
    pub hi: i32,
}

impl YearRange {
    /// Build a range, swapping the ends if given in reverse.
    pub fn new(lo: i32, hi: i32) -> Self {
        Self {
            lo: lo.min(hi),
            hi: lo.max(hi),
        }
    }

    pub fn contains(&self, year: i32) -> bool {
        self.lo <= year && year <= self.hi
    }
}

/// What the year widget can offer, derived from the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearControl {
    /// No record carries a year; nothing can be selected.
    Unavailable,
    /// Exactly one distinct year: the range is fixed to it.
    Fixed(i32),
    /// Slider bounds.
    Range { min: i32, max: i32 },
}

impl YearControl {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let mut years = dataset.observations.iter().filter_map(|o| o.year);
        let Some(first) = years.next() else {
            return YearControl::Unavailable;
        };
        let (min, max) = years.fold((first, first), |(lo, hi), y| (lo.min(y), hi.max(y)));
        if min == max {
            YearControl::Fixed(min)
        } else {
            YearControl::Range { min, max }
        }
    }

    /// The full span of the data.
    pub fn full_range(&self) -> Option<YearRange> {
        match *self {
            YearControl::Unavailable => None,
            YearControl::Fixed(year) => Some(YearRange::new(year, year)),
            YearControl::Range { min, max } => Some(YearRange::new(min, max)),
        }
    }

    /// Pull a requested range inside the data bounds.
    pub fn clamp(&self, requested: YearRange) -> Option<YearRange> {
        let bounds = self.full_range()?;
        let lo = requested.lo.clamp(bounds.lo, bounds.hi);
        let hi = requested.hi.clamp(bounds.lo, bounds.hi);
        Some(YearRange::new(lo, hi))
    }
}

// ---------------------------------------------------------------------------
// Selection + predicate
// ---------------------------------------------------------------------------

/// The user's current choice of habitat and years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FilterSelection {
    pub habitat: HabitatFilter,
    /// `None` only when the data has no years at all.
    pub years: Option<YearRange>,
}

impl FilterSelection {
    /// Everything selected: both habitats, the full year span.
    pub fn initial(control: &YearControl) -> Self {
        Self {
            habitat: HabitatFilter::Both,
            years: control.full_range(),
        }
    }

    /// Same habitat, year range forced inside `control`'s bounds.
    pub fn normalized(self, control: &YearControl) -> Self {
        let years = match (self.years, control) {
            (_, YearControl::Fixed(_)) | (None, _) => control.full_range(),
            (Some(requested), _) => control.clamp(requested),
        };
        Self { years, ..self }
    }
}

/// Return indices of records that pass the year and habitat predicates,
/// in dataset order. Records without a year never pass.
pub fn filtered_indices(dataset: &Dataset, selection: &FilterSelection) -> Vec<usize> {
    let Some(years) = selection.years else {
        return Vec::new();
    };
    dataset
        .observations
        .iter()
        .enumerate()
        .filter(|(_, obs)| {
            obs.year.is_some_and(|y| years.contains(y)) && selection.habitat.matches(obs.habitat)
        })
        .map(|(i, _)| i)
        .collect()
}
