//! Item registry and the per-currency price matrix.

use std::collections::{BTreeMap, HashMap};

use crate::domain::currency::Currency;
use crate::domain::price::Price;
use crate::rates::RateTable;

/// One catalog item and its per-currency prices.
///
/// A missing map entry means "not yet fetched"; `Price::Unavailable` means
/// the region was checked and the item is not offered (or its price text
/// was unusable).
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    id: String,
    name: String,
    prices: BTreeMap<Currency, Price>,
}

impl Item {
    fn new(id: String, name: String) -> Self {
        Self {
            id,
            name,
            prices: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self, currency: Currency) -> Option<Price> {
        self.prices.get(&currency).copied()
    }

    pub fn set_price(&mut self, currency: Currency, price: Price) {
        self.prices.insert(currency, price);
    }

    pub fn populated_cells(&self) -> usize {
        self.prices.len()
    }

    /// Convert the stored price under `from` into `to`.
    ///
    /// An unavailable (or never-fetched) source price propagates without
    /// consulting rates. Identity conversion returns the stored amount
    /// verbatim; anything else goes through the USD base:
    /// `stored / rate(from) * rate(to)`.
    pub fn convert(&self, from: Currency, to: Currency, rates: &RateTable) -> Price {
        let stored = match self.price(from) {
            Some(Price::Amount(value)) => value,
            Some(Price::Unavailable) | None => return Price::Unavailable,
        };

        if from == to {
            return Price::Amount(stored);
        }

        Price::Amount(stored / rates.rate(from) * rates.rate(to))
    }

    /// The currency whose stored price converts to the smallest amount of
    /// `output`. Unavailable cells compare as positive infinity; ties
    /// (including an all-unavailable item) resolve to the first currency in
    /// enumeration order.
    pub fn cheapest_currency(&self, output: Currency, rates: &RateTable) -> Currency {
        let mut cheapest = Currency::ALL[0];
        let mut cheapest_value = f64::INFINITY;

        for currency in Currency::ALL {
            let value = self
                .convert(currency, output, rates)
                .amount()
                .unwrap_or(f64::INFINITY);
            if value < cheapest_value {
                cheapest = currency;
                cheapest_value = value;
            }
        }

        cheapest
    }
}

/// Registry of discovered items in first-discovery order, capped at a
/// configurable maximum. The single source of truth for conversion and
/// reporting.
#[derive(Debug)]
pub struct PriceMatrix {
    items: Vec<Item>,
    index: HashMap<String, usize>,
    cap: usize,
}

impl PriceMatrix {
    pub fn new(cap: usize) -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
            cap,
        }
    }

    /// Register a discovered identifier. Existing items are always kept;
    /// a new identifier is tracked only while the registry is under its
    /// cap. Returns whether the id is tracked after the call.
    pub fn track(&mut self, id: &str, name: &str) -> bool {
        if self.index.contains_key(id) {
            return true;
        }
        if self.items.len() >= self.cap {
            return false;
        }

        self.index.insert(id.to_owned(), self.items.len());
        self.items.push(Item::new(id.to_owned(), name.to_owned()));
        true
    }

    /// Record a price cell for a tracked item. Untracked ids are ignored.
    pub fn record(&mut self, id: &str, currency: Currency, price: Price) {
        if let Some(&slot) = self.index.get(id) {
            self.items[slot].set_price(currency, price);
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.index.get(id).map(|&slot| &self.items[slot])
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub const fn cap(&self) -> usize {
        self.cap
    }

    /// Every (item, currency) pair, `|items| * |currencies|`.
    pub fn expected_cells(&self) -> usize {
        self.items.len() * Currency::ALL.len()
    }

    pub fn populated_cells(&self) -> usize {
        self.items.iter().map(Item::populated_cells).sum()
    }

    /// Cells still awaiting an authoritative fetch, in discovery order then
    /// currency order.
    pub fn missing_cells(&self) -> Vec<(String, Currency)> {
        let mut missing = Vec::new();
        for item in &self.items {
            for currency in Currency::ALL {
                if item.price(currency).is_none() {
                    missing.push((item.id.clone(), currency));
                }
            }
        }
        missing
    }
}
