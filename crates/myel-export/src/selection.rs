//! Which measurements an export includes.

use myel_core::Category;

/// A measured quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    /// Enclosed area.
    Area,
    /// Closed perimeter.
    Perimeter,
    /// Equivalent-circle diameter.
    Diameter,
}

impl Quantity {
    /// Report order.
    pub const ALL: [Self; 3] = [Self::Area, Self::Perimeter, Self::Diameter];

    const fn label(self) -> &'static str {
        match self {
            Self::Area => "Area",
            Self::Perimeter => "Perimeter",
            Self::Diameter => "Diameter",
        }
    }
}

/// The fourteen export switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct ExportSelection {
    pub axon_area: bool,
    pub inner_area: bool,
    pub outer_area: bool,
    pub axon_perimeter: bool,
    pub inner_perimeter: bool,
    pub outer_perimeter: bool,
    pub axon_diameter: bool,
    pub inner_diameter: bool,
    pub outer_diameter: bool,
    pub g_ratio: bool,
    pub misc_area: bool,
    pub misc_perimeter: bool,
    pub misc_diameter: bool,
    /// Counter totals in the report and counter dots on the overlay.
    pub counters: bool,
}

impl Default for ExportSelection {
    fn default() -> Self {
        Self {
            axon_diameter: true,
            inner_diameter: true,
            outer_diameter: true,
            g_ratio: true,
            counters: true,
            ..Self::none()
        }
    }
}

impl ExportSelection {
    /// Nothing selected.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            axon_area: false,
            inner_area: false,
            outer_area: false,
            axon_perimeter: false,
            inner_perimeter: false,
            outer_perimeter: false,
            axon_diameter: false,
            inner_diameter: false,
            outer_diameter: false,
            g_ratio: false,
            misc_area: false,
            misc_perimeter: false,
            misc_diameter: false,
            counters: false,
        }
    }

    /// Everything selected.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            axon_area: true,
            inner_area: true,
            outer_area: true,
            axon_perimeter: true,
            inner_perimeter: true,
            outer_perimeter: true,
            axon_diameter: true,
            inner_diameter: true,
            outer_diameter: true,
            g_ratio: true,
            misc_area: true,
            misc_perimeter: true,
            misc_diameter: true,
            counters: true,
        }
    }

    /// Whether `quantity` is exported for `category`.
    #[must_use]
    pub const fn includes(&self, category: Category, quantity: Quantity) -> bool {
        match (category, quantity) {
            (Category::Axon, Quantity::Area) => self.axon_area,
            (Category::Axon, Quantity::Perimeter) => self.axon_perimeter,
            (Category::Axon, Quantity::Diameter) => self.axon_diameter,
            (Category::InnerMyelin, Quantity::Area) => self.inner_area,
            (Category::InnerMyelin, Quantity::Perimeter) => self.inner_perimeter,
            (Category::InnerMyelin, Quantity::Diameter) => self.inner_diameter,
            (Category::OuterMyelin, Quantity::Area) => self.outer_area,
            (Category::OuterMyelin, Quantity::Perimeter) => self.outer_perimeter,
            (Category::OuterMyelin, Quantity::Diameter) => self.outer_diameter,
            (Category::Misc, Quantity::Area) => self.misc_area,
            (Category::Misc, Quantity::Perimeter) => self.misc_perimeter,
            (Category::Misc, Quantity::Diameter) => self.misc_diameter,
        }
    }

    /// Selected fiber columns in report order: all areas, then all
    /// perimeters, then all diameters, axon first within each.
    #[must_use]
    pub fn fiber_columns(&self) -> Vec<(Category, Quantity)> {
        Quantity::ALL
            .into_iter()
            .flat_map(|q| Category::FIBER.into_iter().map(move |c| (c, q)))
            .filter(|&(c, q)| self.includes(c, q))
            .collect()
    }

    /// Selected misc columns in report order.
    #[must_use]
    pub fn misc_columns(&self) -> Vec<Quantity> {
        Quantity::ALL
            .into_iter()
            .filter(|&q| self.includes(Category::Misc, q))
            .collect()
    }

    /// Whether any misc column is selected.
    #[must_use]
    pub const fn any_misc(&self) -> bool {
        self.misc_area || self.misc_perimeter || self.misc_diameter
    }
}

/// Report header text for a column.
#[must_use]
pub fn column_label(category: Category, quantity: Quantity) -> String {
    let prefix = match category {
        Category::Axon => "Axon",
        Category::InnerMyelin => "Inner",
        Category::OuterMyelin => "Outer",
        Category::Misc => "Misc.",
    };
    format!("{prefix} {}", quantity.label())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_dialog() {
        let s = ExportSelection::default();
        assert_eq!(
            s.fiber_columns(),
            vec![
                (Category::Axon, Quantity::Diameter),
                (Category::InnerMyelin, Quantity::Diameter),
                (Category::OuterMyelin, Quantity::Diameter),
            ]
        );
        assert!(s.g_ratio);
        assert!(s.counters);
        assert!(!s.any_misc());
    }

    #[test]
    fn labels_match_report_headers() {
        assert_eq!(column_label(Category::InnerMyelin, Quantity::Area), "Inner Area");
        assert_eq!(column_label(Category::Misc, Quantity::Perimeter), "Misc. Perimeter");
        assert_eq!(ExportSelection::all().fiber_columns().len(), 9);
        assert!(ExportSelection::none().fiber_columns().is_empty());
    }
}
