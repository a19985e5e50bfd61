use rust_decimal::Decimal;

/// Search facets for one request.
///
/// Every field uses its zero value as the "absent" sentinel. The caller is
/// expected to have validated the raw input already (see
/// [`cli::params`](crate::cli::params)); the engine never rejects a query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    /// Substring the record make must contain (empty = absent)
    pub make: String,

    /// Substring the record model must contain (empty = absent)
    pub model: String,

    /// Target price; records within 10% either side match (zero = absent)
    pub budget: Decimal,

    /// Exact model year (zero = absent)
    pub year: u32,
}

impl Query {
    /// Creates a query with every facet absent.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_make(mut self, make: impl Into<String>) -> Self {
        self.make = make.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_budget(mut self, budget: Decimal) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_year(mut self, year: u32) -> Self {
        self.year = year;
        self
    }

    pub fn has_make(&self) -> bool {
        !self.make.is_empty()
    }

    pub fn has_model(&self) -> bool {
        !self.model.is_empty()
    }

    pub fn has_budget(&self) -> bool {
        self.budget > Decimal::ZERO
    }

    pub fn has_year(&self) -> bool {
        self.year > 0
    }

    /// True when no facet is present.
    pub fn is_empty(&self) -> bool {
        !(self.has_make() || self.has_model() || self.has_budget() || self.has_year())
    }
}
