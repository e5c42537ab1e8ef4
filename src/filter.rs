use std::ops::Range;

use crate::catalog::{ALL_CATEGORY, Catalog, CatalogEntry, is_reserved_category};

/// A gallery category selection. `All` is the synthetic "show everything" option.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Category {
    #[default]
    All,
    Named(String),
}

impl Category {
    /// Every selectable category: `All` followed by the catalog's categories.
    pub fn enumerate(catalog: &Catalog) -> Vec<Category> {
        std::iter::once(Category::All)
            .chain(
                catalog
                    .category_names()
                    .iter()
                    .map(|c| Category::Named(c.clone())),
            )
            .collect()
    }

    /// Restores a category from its persisted name. Catalogs never contain a
    /// group named `"all"`, so that name always means `All`.
    pub fn from_name(name: &str) -> Category {
        if is_reserved_category(name) {
            Category::All
        } else {
            Category::Named(name.to_string())
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Category::All => ALL_CATEGORY,
            Category::Named(name) => name,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Category::All => "All",
            Category::Named(name) => name,
        }
    }

    pub fn matches(&self, entry: &CatalogEntry) -> bool {
        match self {
            Category::All => true,
            Category::Named(name) => entry.category == *name,
        }
    }
}

/// The catalog entries matching a category, in catalog order.
///
/// Holds catalog positions rather than copies so entries keep their identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredSequence {
    positions: Vec<usize>,
}

impl FilteredSequence {
    pub fn new(catalog: &Catalog, category: &Category) -> Self {
        let positions = catalog
            .entries()
            .iter()
            .enumerate()
            .filter(|(_, entry)| category.matches(entry))
            .map(|(pos, _)| pos)
            .collect();
        Self { positions }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn get<'a>(&self, catalog: &'a Catalog, index: usize) -> Option<&'a CatalogEntry> {
        self.positions.get(index).and_then(|&pos| catalog.get(pos))
    }

    /// Entries in `range` (clamped to the sequence) paired with their filtered index.
    pub fn slice<'a>(
        &'a self,
        catalog: &'a Catalog,
        range: Range<usize>,
    ) -> impl Iterator<Item = (usize, &'a CatalogEntry)> + 'a {
        let end = range.end.min(self.positions.len());
        let start = range.start.min(end);
        self.positions[start..end]
            .iter()
            .enumerate()
            .filter_map(move |(offset, &pos)| catalog.get(pos).map(|e| (start + offset, e)))
    }

    pub fn iter<'a>(
        &'a self,
        catalog: &'a Catalog,
    ) -> impl Iterator<Item = (usize, &'a CatalogEntry)> + 'a {
        self.slice(catalog, 0..self.positions.len())
    }
}
