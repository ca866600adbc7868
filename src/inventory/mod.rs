//! Inventory heuristics derived from a predicted sales quantity.

use std::fmt;

/// Average sales per day the suggestion thresholds are calibrated against.
pub const AVG_SALES: f32 = 50.0;

/// Fraction of the predicted quantity held back as safety stock.
pub const SAFETY_STOCK_PERCENTAGE: f32 = 0.2;

/// Average replenishment lead time in days.
pub const LEAD_TIME_DAYS: f32 = 5.0;

/// Stocking suggestion derived from the predicted quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockSuggestion {
    Increase,
    Reduce,
    Maintain,
}

impl StockSuggestion {
    /// Classify a predicted quantity.
    ///
    /// Both comparisons are strict: a prediction of exactly `AVG_SALES` or
    /// exactly half of it maintains current levels.
    pub fn for_quantity(predicted_quantity: f32) -> Self {
        if predicted_quantity > AVG_SALES {
            StockSuggestion::Increase
        } else if predicted_quantity < AVG_SALES * 0.5 {
            StockSuggestion::Reduce
        } else {
            StockSuggestion::Maintain
        }
    }

    /// The user-facing suggestion text.
    pub fn as_str(&self) -> &'static str {
        match self {
            StockSuggestion::Increase => "Increase stock levels to meet demand.",
            StockSuggestion::Reduce => "Reduce inventory to avoid overstocking.",
            StockSuggestion::Maintain => "Maintain current inventory levels.",
        }
    }
}

impl fmt::Display for StockSuggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The predicted quantity and its three derived inventory figures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InventoryPlan {
    pub predicted_quantity: f32,
    pub safety_stock: f32,
    pub reorder_point: f32,
    pub suggestion: StockSuggestion,
}

impl InventoryPlan {
    /// Derive the plan from a predicted sales quantity.
    pub fn from_prediction(predicted_quantity: f32) -> Self {
        let safety_stock = SAFETY_STOCK_PERCENTAGE * predicted_quantity;
        let reorder_point = predicted_quantity * LEAD_TIME_DAYS + safety_stock;

        Self {
            predicted_quantity,
            safety_stock,
            reorder_point,
            suggestion: StockSuggestion::for_quantity(predicted_quantity),
        }
    }
}
