//! Cart contents description
//!
//! Renders a cart's line items as readable text for notices, receipts and
//! charge comments, e.g.
//! `"Adult membership #104 for Ada Lovelace, and Supporting membership for Charles"`.

use crate::items::ItemKind;

/// Character budget when no other limit applies. Matches the width of a
/// varchar column.
pub const DEFAULT_MAX_CHARS: usize = 255;

/// Character budget for descriptions sent by email.
pub const EMAIL_MAX_CHARS: usize = 10_000;

/// Character budget for descriptions shown on screen.
pub const SCREEN_MAX_CHARS: usize = 10_000;

const BASE_ITEM_ESTIMATE: usize = 50;
const LAST_ITEM_CONJUNCTION: &str = "and ";
const SEPARATOR: &str = ", ";

/// Names of the person an item is for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeneficiaryName {
    /// Full name.
    pub full: String,

    /// Shortened name used when space is tight.
    pub short: String,
}

impl BeneficiaryName {
    /// Builds full and short names from a contact's name parts.
    ///
    /// The short form is the preferred name if there is one, otherwise the
    /// first name and the initial of the last name.
    pub fn from_parts(first_name: &str, last_name: &str, preferred_name: Option<&str>) -> Self {
        let full = match preferred_name {
            Some(preferred) if !preferred.trim().is_empty() => preferred.trim().to_string(),
            _ => format!("{first_name} {last_name}").trim().to_string(),
        };

        let short = match preferred_name {
            Some(preferred) if !preferred.trim().is_empty() => {
                preferred.split_whitespace().next().unwrap_or(preferred).to_string()
            }
            _ => match last_name.chars().next() {
                Some(initial) => format!("{first_name} {initial}.").trim().to_string(),
                None => first_name.trim().to_string(),
            },
        };

        Self { full, short }
    }
}

/// One line item as it should be described.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribedItem {
    /// Display name of what is bought, e.g. "Adult".
    pub display_name: String,

    /// Item kind.
    pub kind: ItemKind,

    /// Identifier a layperson recognises, e.g. a membership number.
    pub unique_id: Option<String>,

    /// Who the item is for.
    pub beneficiary: Option<BeneficiaryName>,
}

/// Where a description ends up, which decides its default budget.
///
/// Ordered so that a wider audience never narrows the budget again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
enum Audience {
    #[default]
    Column,
    Email,
    Screen,
}

impl Audience {
    const fn max_chars(self) -> usize {
        match self {
            Self::Column => DEFAULT_MAX_CHARS,
            Self::Email => EMAIL_MAX_CHARS,
            Self::Screen => SCREEN_MAX_CHARS,
        }
    }
}

/// Rendering switches, stored as bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Flags(u8);

impl Flags {
    const REPEAT_EVENT_NAME: Self = Self(1);
    const UNIQUE_IDS: Self = Self(1 << 1);
    const FULL_CONTACT_NAMES: Self = Self(1 << 2);

    const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    const fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

/// Options for describing a cart's contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartContentsDescription {
    event_name: Option<String>,
    flags: Flags,
    audience: Audience,
    max_chars: Option<usize>,
}

impl CartContentsDescription {
    /// Describes items within the default character budget.
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepends the event name to the first item.
    #[must_use]
    pub fn with_event_name(mut self, name: impl Into<String>) -> Self {
        self.event_name = Some(name.into());
        self
    }

    /// Repeats the event name in front of every item.
    #[must_use]
    pub fn repeating_event_name(mut self) -> Self {
        self.flags = self.flags.with(Flags::REPEAT_EVENT_NAME);
        self
    }

    /// Includes the layperson unique id of each item.
    #[must_use]
    pub fn with_unique_ids(mut self) -> Self {
        self.flags = self.flags.with(Flags::UNIQUE_IDS);
        self
    }

    /// Never shortens beneficiary names.
    #[must_use]
    pub fn full_contact_names(mut self) -> Self {
        self.flags = self.flags.with(Flags::FULL_CONTACT_NAMES);
        self
    }

    /// Uses the email character budget.
    #[must_use]
    pub fn for_email(mut self) -> Self {
        self.audience = self.audience.max(Audience::Email);
        self
    }

    /// Uses the on-screen character budget.
    #[must_use]
    pub fn for_screen(mut self) -> Self {
        self.audience = self.audience.max(Audience::Screen);
        self
    }

    /// Overrides the character budget.
    #[must_use]
    pub fn max_characters(mut self, max: usize) -> Self {
        self.max_chars = Some(max);
        self
    }

    /// Effective character budget.
    pub fn max_chars(&self) -> usize {
        self.max_chars.unwrap_or_else(|| self.audience.max_chars())
    }

    fn item_estimate(&self) -> usize {
        let mut estimate = BASE_ITEM_ESTIMATE;

        if self.flags.contains(Flags::REPEAT_EVENT_NAME) {
            estimate += 10;
        }

        if self.flags.contains(Flags::UNIQUE_IDS) {
            estimate += 10;
        }

        estimate
    }

    /// Describes each item, stopping early with a summary of what was left
    /// out once the budget runs low.
    pub fn describe_items(&self, items: &[DescribedItem]) -> Vec<String> {
        let max = self.max_chars();
        let estimate = self.item_estimate();
        let shorten = !self.flags.contains(Flags::FULL_CONTACT_NAMES)
            && items.len().saturating_mul(estimate) >= max;

        let mut descriptions = Vec::with_capacity(items.len());
        let mut tally = 0_usize;

        for (index, item) in items.iter().enumerate() {
            let mut text = self.describe_item(item, index, shorten);
            let remaining = max.saturating_sub(tally + text.chars().count());
            let after = items.len() - index - 1;
            let mut finished = false;

            if after == 0 {
                if index > 0 && remaining >= LAST_ITEM_CONJUNCTION.len() {
                    text.insert_str(0, LAST_ITEM_CONJUNCTION);
                }
            } else if remaining < estimate {
                if remaining >= 25 {
                    text = format!("{text} and {after} other item(s)");
                }

                finished = true;
            } else {
                text.push_str(SEPARATOR);
            }

            tally += text.chars().count();
            descriptions.push(text);

            if finished || tally >= max {
                break;
            }
        }

        descriptions
    }

    /// Describes the items as a single line that fits the budget.
    pub fn describe(&self, items: &[DescribedItem]) -> String {
        let joined = self.describe_items(items).concat();
        let trimmed = joined.trim().trim_end_matches(',');

        trimmed.chars().take(self.max_chars()).collect()
    }

    fn describe_item(&self, item: &DescribedItem, index: usize, shorten: bool) -> String {
        let prefix = match &self.event_name {
            Some(event) if index == 0 || self.flags.contains(Flags::REPEAT_EVENT_NAME) => {
                format!("{event} ")
            }
            _ => String::new(),
        };

        let mut text = format!("{prefix}{} {}", item.display_name, item.kind);

        if self.flags.contains(Flags::UNIQUE_IDS)
            && let Some(id) = &item.unique_id
        {
            text.push(' ');
            text.push_str(id);
        }

        if let Some(beneficiary) = &item.beneficiary {
            let name = if shorten {
                &beneficiary.short
            } else {
                &beneficiary.full
            };

            text.push_str(" for ");
            text.push_str(name);
        }

        text
    }
}
