use std::str::FromStr;

use inquire::{error::InquireError, Text};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::billing::{InvoicePosition, InvoiceSummary, PositionDraft};
use crate::company::PositionDefaults;
use crate::error::InvoiceError;

type InputResult<T> = Result<T, InvoiceError>;

/// Source of operator answers.
///
/// `Ok(None)` means nothing usable was read and the caller falls back to
/// its default. Errors are reserved for the operator aborting the run.
pub trait Prompter {
    fn ask(&mut self, message: &str, default: &str) -> InputResult<Option<String>>;
}

/// Reads answers from the terminal.
pub struct InquirePrompter;

impl Prompter for InquirePrompter {
    fn ask(&mut self, message: &str, default: &str) -> InputResult<Option<String>> {
        let answer = Text::new(message)
            .with_help_message(&format!(
                "Hit <enter> to use the default: {}",
                default
            ))
            .prompt();

        match answer {
            Ok(line) => Ok(Some(line)),
            Err(InquireError::OperationInterrupted) => {
                Err(InquireError::OperationInterrupted.into())
            }
            Err(error) => {
                warn!("Could not read answer to '{}': {}", message, error);
                Ok(None)
            }
        }
    }
}

fn answer<P: Prompter + ?Sized>(
    prompter: &mut P,
    message: &str,
    default: &str,
) -> InputResult<Option<String>> {
    Ok(prompter
        .ask(message, default)?
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty()))
}

fn parsed<P, T>(prompter: &mut P, message: &str, default: T) -> InputResult<T>
where
    P: Prompter + ?Sized,
    T: FromStr + ToString,
{
    let shown = default.to_string();
    Ok(match answer(prompter, message, &shown)? {
        None => default,
        Some(line) => line.parse().unwrap_or_else(|_| {
            debug!("'{}' is not a valid answer, using {}", line, shown);
            default
        }),
    })
}

pub fn text<P: Prompter + ?Sized>(
    prompter: &mut P,
    message: &str,
    default: &str,
) -> InputResult<String> {
    Ok(answer(prompter, message, default)?.unwrap_or_else(|| default.to_string()))
}

/// A non-negative currency amount.
pub fn amount<P: Prompter + ?Sized>(
    prompter: &mut P,
    message: &str,
    default: Decimal,
) -> InputResult<Decimal> {
    let value = parsed(prompter, message, default)?;
    Ok(if value.is_sign_negative() { default } else { value })
}

/// A whole, non-negative percentage. Fractions are dropped.
pub fn percentage<P: Prompter + ?Sized>(
    prompter: &mut P,
    message: &str,
    default: u32,
) -> InputResult<u32> {
    let value: Decimal = parsed(prompter, message, Decimal::from(default))?;
    Ok(value.trunc().to_u32().unwrap_or(default))
}

pub fn quantity<P: Prompter + ?Sized>(
    prompter: &mut P,
    message: &str,
    default: u32,
) -> InputResult<u32> {
    parsed(prompter, message, default)
}

/// Anything but an exact `Y` ends the loop.
pub fn add_another<P: Prompter + ?Sized>(prompter: &mut P) -> InputResult<bool> {
    Ok(answer(prompter, "Add another position? Y/n", "n")?.as_deref() == Some("Y"))
}

fn default_rate(defaults: &PositionDefaults) -> u32 {
    defaults.default_tax_rate.trunc().to_u32().unwrap_or_default()
}

fn position_draft<P: Prompter + ?Sized>(
    prompter: &mut P,
    defaults: &PositionDefaults,
) -> InputResult<PositionDraft> {
    let name = text(prompter, "Product:", &defaults.default_product)?;
    let unit = text(prompter, "Unit:", &defaults.default_unit)?;
    let net_price = amount(prompter, "Net price:", defaults.default_net_price)?;
    let tax_rate = percentage(prompter, "Tax rate:", default_rate(defaults))?;
    let classification = text(
        prompter,
        "Polish classification of goods and services:",
        &defaults.classification,
    )?;
    let quantity = quantity(prompter, "Quantity:", defaults.default_quantity)?;
    let currency = text(prompter, "Currency:", &defaults.default_currency)?;

    Ok(PositionDraft {
        name,
        classification,
        unit,
        quantity,
        net_price,
        tax_rate,
        currency,
    })
}

/// The item and the running total including it, unless either overflows.
fn priced(
    item_no: usize,
    draft: PositionDraft,
    total: InvoiceSummary,
) -> Option<(InvoicePosition, InvoiceSummary)> {
    let position = InvoicePosition::new(item_no, draft)?;
    let total = total.checked_add(InvoiceSummary::from(&position))?;
    Some((position, total))
}

/// Collects line items until the operator stops. Always at least one.
///
/// An item whose amounts overflow is priced with the configured net price,
/// tax rate and quantity instead.
pub fn positions<P: Prompter + ?Sized>(
    prompter: &mut P,
    defaults: &PositionDefaults,
) -> InputResult<Vec<InvoicePosition>> {
    let mut positions: Vec<InvoicePosition> = Vec::new();
    let mut total = InvoiceSummary::default();

    loop {
        let item_no = positions.len() + 1;
        let draft = position_draft(prompter, defaults)?;

        let (position, with_item) = match priced(item_no, draft.clone(), total) {
            Some(priced) => priced,
            None => {
                warn!("Amounts of item {} are too large, using the defaults", item_no);
                let fallback = PositionDraft {
                    net_price: defaults.default_net_price,
                    tax_rate: default_rate(defaults),
                    quantity: defaults.default_quantity,
                    ..draft
                };
                priced(item_no, fallback, total)
                    .ok_or(InvoiceError::AmountOverflow { item_no })?
            }
        };
        positions.push(position);
        total = with_item;

        if !add_another(prompter)? {
            break;
        }
    }

    Ok(positions)
}

#[cfg(test)]
pub mod testing {
    use std::collections::VecDeque;

    use inquire::error::InquireError;

    use super::{InputResult, Prompter};

    #[derive(Debug)]
    enum Scripted {
        Answer(String),
        Fail,
        Interrupt,
    }

    /// Replays canned answers. A failed read and an exhausted script both
    /// answer nothing; an interrupt aborts like Ctrl-C.
    #[derive(Debug, Default)]
    pub struct ScriptedPrompter {
        answers: VecDeque<Scripted>,
        pub asked: Vec<String>,
    }

    impl ScriptedPrompter {
        pub fn new(answers: &[&str]) -> Self {
            Self {
                answers: answers
                    .iter()
                    .map(|a| Scripted::Answer(a.to_string()))
                    .collect(),
                asked: Vec::new(),
            }
        }

        pub fn then_fail(mut self) -> Self {
            self.answers.push_back(Scripted::Fail);
            self
        }

        pub fn then_interrupt(mut self) -> Self {
            self.answers.push_back(Scripted::Interrupt);
            self
        }

        pub fn remaining(&self) -> usize {
            self.answers.len()
        }
    }

    impl Prompter for ScriptedPrompter {
        fn ask(&mut self, message: &str, _default: &str) -> InputResult<Option<String>> {
            self.asked.push(message.to_string());
            match self.answers.pop_front() {
                Some(Scripted::Answer(answer)) => Ok(Some(answer)),
                Some(Scripted::Fail) | None => Ok(None),
                Some(Scripted::Interrupt) => Err(InquireError::OperationInterrupted.into()),
            }
        }
    }
}
