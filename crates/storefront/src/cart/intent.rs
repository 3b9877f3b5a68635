//! Cart mutation intents and their coalescing keys.

use std::fmt;

use luneva_core::types::{CartLineId, GiftCardId, MerchandiseId};
use thiserror::Error;

use crate::shopify::{CartLineInput, CartLineUpdateInput, CartMerchandise};

/// Identifies mutations that replace one another.
///
/// Two intents with equal keys touch the same cart state; the newer one
/// supersedes the older. Intents with different keys run independently.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CoalescingKey(String);

impl CoalescingKey {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CoalescingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CoalescingKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

fn keyed<'a>(family: &str, ids: impl Iterator<Item = &'a str>) -> CoalescingKey {
    let mut ids: Vec<&str> = ids.collect();
    ids.sort_unstable();
    ids.dedup();
    CoalescingKey(format!("{family}-{}", ids.join("-")))
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntentError {
    #[error("no cart lines given")]
    NoLines,

    #[error("quantity must be at least 1")]
    ZeroQuantity,

    #[error("a gift card code is required")]
    NoGiftCardCode,

    #[error("no gift cards given")]
    NoGiftCards,
}

/// A requested cart mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartIntent {
    /// Add merchandise. `previews` carries display data for lines the
    /// cart does not contain yet.
    LinesAdd {
        lines: Vec<CartLineInput>,
        previews: Vec<CartMerchandise>,
    },
    LinesUpdate {
        lines: Vec<CartLineUpdateInput>,
    },
    LinesRemove {
        line_ids: Vec<CartLineId>,
    },
    /// Replace the full set of discount codes; empty removes all.
    DiscountCodesUpdate {
        codes: Vec<String>,
    },
    /// Replace the full set of gift card codes.
    GiftCardCodesUpdate {
        codes: Vec<String>,
    },
    GiftCardCodesRemove {
        ids: Vec<GiftCardId>,
    },
}

impl CartIntent {
    /// Intent for setting a line to `quantity`. Zero becomes a remove.
    #[must_use]
    pub fn set_quantity(line_id: CartLineId, quantity: u32) -> Self {
        if quantity == 0 {
            Self::LinesRemove {
                line_ids: vec![line_id],
            }
        } else {
            Self::LinesUpdate {
                lines: vec![CartLineUpdateInput { id: line_id, quantity }],
            }
        }
    }

    /// Target quantity for a decrease control, `None` when the control is
    /// inert (the visible minimum is 1; removal is a separate control).
    #[must_use]
    pub const fn decrease_target(current: u32) -> Option<u32> {
        if current > 1 { Some(current - 1) } else { None }
    }

    #[must_use]
    pub const fn increase_target(current: u32) -> u32 {
        current.saturating_add(1)
    }

    /// Add-to-cart intent with a display preview.
    #[must_use]
    pub fn add(merchandise: CartMerchandise, quantity: u32) -> Self {
        Self::LinesAdd {
            lines: vec![CartLineInput::new(merchandise.id.clone(), quantity)],
            previews: vec![merchandise],
        }
    }

    /// Discount codes normalized for submission: trimmed, empty entries
    /// dropped, duplicates removed case-insensitively.
    #[must_use]
    pub fn discount_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::DiscountCodesUpdate {
            codes: normalize_codes(codes),
        }
    }

    #[must_use]
    pub fn gift_card_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::GiftCardCodesUpdate {
            codes: normalize_codes(codes),
        }
    }

    /// Action family name, used in logs and error messages.
    #[must_use]
    pub const fn action(&self) -> &'static str {
        match self {
            Self::LinesAdd { .. } => "LinesAdd",
            Self::LinesUpdate { .. } => "LinesUpdate",
            Self::LinesRemove { .. } => "LinesRemove",
            Self::DiscountCodesUpdate { .. } => "DiscountCodesUpdate",
            Self::GiftCardCodesUpdate { .. } => "GiftCardCodesUpdate",
            Self::GiftCardCodesRemove { .. } => "GiftCardCodesRemove",
        }
    }

    /// The coalescing key. Line updates and removes share the
    /// `LinesUpdate` family so a remove supersedes a pending quantity change.
    #[must_use]
    pub fn key(&self) -> CoalescingKey {
        match self {
            Self::LinesAdd { lines, .. } => keyed(
                "LinesAdd",
                lines.iter().map(|line| line.merchandise_id.as_str()),
            ),
            Self::LinesUpdate { lines } => {
                keyed("LinesUpdate", lines.iter().map(|line| line.id.as_str()))
            }
            Self::LinesRemove { line_ids } => {
                keyed("LinesUpdate", line_ids.iter().map(CartLineId::as_str))
            }
            Self::DiscountCodesUpdate { .. } => CoalescingKey::from("DiscountCodesUpdate"),
            Self::GiftCardCodesUpdate { .. } => CoalescingKey::from("GiftCardCodesUpdate"),
            Self::GiftCardCodesRemove { ids } => {
                keyed("GiftCardCodesRemove", ids.iter().map(GiftCardId::as_str))
            }
        }
    }

    /// Line ids whose display is provisional while this intent is pending.
    pub fn touched_lines(&self) -> impl Iterator<Item = &CartLineId> {
        let ids: Box<dyn Iterator<Item = &CartLineId>> = match self {
            Self::LinesUpdate { lines } => Box::new(lines.iter().map(|line| &line.id)),
            Self::LinesRemove { line_ids } => Box::new(line_ids.iter()),
            _ => Box::new(std::iter::empty()),
        };
        ids
    }

    /// Merchandise ids added by this intent.
    pub fn added_merchandise(&self) -> impl Iterator<Item = &MerchandiseId> {
        let ids: Box<dyn Iterator<Item = &MerchandiseId>> = match self {
            Self::LinesAdd { lines, .. } => Box::new(lines.iter().map(|line| &line.merchandise_id)),
            _ => Box::new(std::iter::empty()),
        };
        ids
    }

    /// Check the intent can be sent.
    ///
    /// # Errors
    ///
    /// Returns an [`IntentError`] for empty line lists, zero quantities on
    /// add or update, and empty gift card submissions.
    pub fn validate(&self) -> Result<(), IntentError> {
        match self {
            Self::LinesAdd { lines, .. } => {
                if lines.is_empty() {
                    return Err(IntentError::NoLines);
                }
                if lines.iter().any(|line| line.quantity == 0) {
                    return Err(IntentError::ZeroQuantity);
                }
            }
            Self::LinesUpdate { lines } => {
                if lines.is_empty() {
                    return Err(IntentError::NoLines);
                }
                if lines.iter().any(|line| line.quantity == 0) {
                    return Err(IntentError::ZeroQuantity);
                }
            }
            Self::LinesRemove { line_ids } => {
                if line_ids.is_empty() {
                    return Err(IntentError::NoLines);
                }
            }
            Self::DiscountCodesUpdate { .. } => {}
            Self::GiftCardCodesUpdate { codes } => {
                if codes.is_empty() {
                    return Err(IntentError::NoGiftCardCode);
                }
            }
            Self::GiftCardCodesRemove { ids } => {
                if ids.is_empty() {
                    return Err(IntentError::NoGiftCards);
                }
            }
        }
        Ok(())
    }
}

fn normalize_codes<I, S>(codes: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = Vec::new();
    for code in codes {
        let code = code.as_ref().trim();
        if !code.is_empty()
            && !normalized
                .iter()
                .any(|existing| existing.eq_ignore_ascii_case(code))
        {
            normalized.push(code.to_string());
        }
    }
    normalized
}
