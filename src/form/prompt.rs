//! Interactive prompt layer for the request form.
//!
//! Reads the form fields from any [`BufRead`], re-prompting until each field
//! parses and validates. Fields already supplied (e.g. via CLI flags) arrive
//! in a [`RequestDraft`] and are not prompted for, so a fully-flagged
//! invocation runs without touching the terminal.

use std::io::{self, BufRead, Write};

use chrono::NaiveDate;

use super::{
    defaults, parse_budget, parse_daily_sales_percentage, parse_date, parse_flag,
    parse_machinery, parse_market_share, parse_region, FieldError, Machinery,
    PredictionRequest, Region,
};

/// Fields supplied ahead of the interactive session.
///
/// Values here are already validated; the prompter only asks for what is
/// still `None`.
#[derive(Debug, Clone, Default)]
pub struct RequestDraft {
    pub date: Option<NaiveDate>,
    pub daily_sales_percentage: Option<f64>,
    pub market_share: Option<u8>,
    pub political: Option<bool>,
    pub marketing: Option<bool>,
    pub budget: Option<f64>,
    pub machinery: Option<Machinery>,
    pub region: Option<Region>,
}

impl RequestDraft {
    /// Whether every field is already supplied.
    pub fn is_complete(&self) -> bool {
        self.date.is_some()
            && self.daily_sales_percentage.is_some()
            && self.market_share.is_some()
            && self.political.is_some()
            && self.marketing.is_some()
            && self.budget.is_some()
            && self.machinery.is_some()
            && self.region.is_some()
    }
}

/// Prompt-driven form filler over arbitrary input/output streams.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Fill the remaining fields of `draft` from the input stream and build
    /// the validated request.
    pub fn fill(&mut self, draft: RequestDraft) -> io::Result<PredictionRequest> {
        let date = match draft.date {
            Some(v) => v,
            None => self.ask("Select date (YYYY-MM-DD)", None, parse_date)?,
        };
        let daily_sales_percentage = match draft.daily_sales_percentage {
            Some(v) => v,
            None => {
                let default = defaults::DAILY_SALES_PERCENTAGE.to_string();
                self.ask(
                    "Daily sales percentage (0.0 - 1.0)",
                    Some(default.as_str()),
                    parse_daily_sales_percentage,
                )?
            }
        };
        let market_share = match draft.market_share {
            Some(v) => v,
            None => {
                let default = defaults::MARKET_SHARE.to_string();
                self.ask("Market share (0 - 100)", Some(default.as_str()), parse_market_share)?
            }
        };
        let political = match draft.political {
            Some(v) => v,
            None => self.ask("Political situation (0/1)", Some("1"), |s| {
                parse_flag("political situation", s)
            })?,
        };
        let marketing = match draft.marketing {
            Some(v) => v,
            None => self.ask("Marketing strategy (0/1)", Some("1"), |s| {
                parse_flag("marketing strategy", s)
            })?,
        };
        let budget = match draft.budget {
            Some(v) => v,
            None => {
                let default = defaults::BUDGET.to_string();
                self.ask("Marketing budget", Some(default.as_str()), parse_budget)?
            }
        };
        let machinery = match draft.machinery {
            Some(v) => v,
            None => {
                self.list_options("Infrastructure machinery", Machinery::ALL.iter())?;
                self.ask(
                    "Infrastructure machinery (number or name)",
                    Some(defaults::MACHINERY.label()),
                    parse_machinery,
                )?
            }
        };
        let region = match draft.region {
            Some(v) => v,
            None => {
                self.list_options("Region", Region::ALL.iter())?;
                self.ask(
                    "Region (number or name)",
                    Some(defaults::REGION.label()),
                    parse_region,
                )?
            }
        };

        PredictionRequest::new(
            date,
            daily_sales_percentage,
            i64::from(market_share),
            political,
            marketing,
            budget,
            machinery,
            region,
        )
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))
    }

    fn list_options<T: std::fmt::Display>(
        &mut self,
        label: &str,
        options: impl Iterator<Item = T>,
    ) -> io::Result<()> {
        writeln!(self.output, "{label}:")?;
        for (i, option) in options.enumerate() {
            writeln!(self.output, "  {}. {option}", i + 1)?;
        }
        Ok(())
    }

    /// Ask for one field until a valid value arrives.
    ///
    /// An empty line accepts the default, when there is one.
    fn ask<T>(
        &mut self,
        label: &str,
        default: Option<&str>,
        parse: impl Fn(&str) -> Result<T, FieldError>,
    ) -> io::Result<T> {
        loop {
            match default {
                Some(d) => write!(self.output, "{label} [{d}]: ")?,
                None => write!(self.output, "{label}: ")?,
            }
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "input closed before the form was complete",
                ));
            }

            let answer = match (line.trim(), default) {
                ("", Some(d)) => d,
                (entered, _) => entered,
            };

            match parse(answer) {
                Ok(value) => return Ok(value),
                Err(e) => writeln!(self.output, "  {e}")?,
            }
        }
    }
}
