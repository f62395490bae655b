//! Date and time composite genes.
//!
//! Dates and times are composed from bounded integer parts and print in
//! RFC 3339 shapes. Day bounds stop at 28 so any generated combination is a
//! real calendar date.

use germ_core::Randomness;

use crate::IntegerGene;

/// A calendar date composed of year/month/day parts.
#[derive(Debug, Clone)]
pub struct DateGene {
    pub name: String,
    pub year: IntegerGene,
    pub month: IntegerGene,
    pub day: IntegerGene,
}

impl DateGene {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            year: IntegerGene::new("year")
                .with_range(Some(1900), Some(2100))
                .with_value(2016),
            month: IntegerGene::new("month")
                .with_range(Some(1), Some(12))
                .with_value(3),
            day: IntegerGene::new("day")
                .with_range(Some(1), Some(28))
                .with_value(12),
        }
    }

    pub fn is_locally_valid(&self) -> bool {
        self.year.is_locally_valid() && self.month.is_locally_valid() && self.day.is_locally_valid()
    }

    pub fn randomize(&mut self, rng: &mut Randomness, force_new: bool) {
        self.year.randomize(rng, force_new);
        self.month.randomize(rng, force_new);
        self.day.randomize(rng, force_new);
    }

    pub fn value_as_raw_string(&self) -> String {
        format!(
            "{:04}-{:02}-{:02}",
            self.year.value, self.month.value, self.day.value
        )
    }

    pub fn copy_value_from(&mut self, other: &DateGene) {
        self.year.value = other.year.value;
        self.month.value = other.month.value;
        self.day.value = other.day.value;
    }

    pub fn contains_same_value_as(&self, other: &DateGene) -> bool {
        self.year.value == other.year.value
            && self.month.value == other.month.value
            && self.day.value == other.day.value
    }

    /// Parse a `YYYY-MM-DD` string into the parts. Returns false without
    /// modifying the gene when the shape does not fit.
    pub fn bind_from_str(&mut self, raw: &str) -> bool {
        let parts: Vec<&str> = raw.split('-').collect();
        if parts.len() != 3 {
            return false;
        }
        let parsed: Option<(i64, i64, i64)> = (|| {
            Some((
                parts[0].parse().ok()?,
                parts[1].parse().ok()?,
                parts[2].parse().ok()?,
            ))
        })();
        match parsed {
            Some((y, m, d)) => {
                self.year.value = y;
                self.month.value = m;
                self.day.value = d;
                true
            }
            None => false,
        }
    }
}

/// A time of day composed of hour/minute/second parts.
#[derive(Debug, Clone)]
pub struct TimeGene {
    pub name: String,
    pub hour: IntegerGene,
    pub minute: IntegerGene,
    pub second: IntegerGene,
}

impl TimeGene {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hour: IntegerGene::new("hour").with_range(Some(0), Some(23)),
            minute: IntegerGene::new("minute").with_range(Some(0), Some(59)),
            second: IntegerGene::new("second").with_range(Some(0), Some(59)),
        }
    }

    pub fn is_locally_valid(&self) -> bool {
        self.hour.is_locally_valid()
            && self.minute.is_locally_valid()
            && self.second.is_locally_valid()
    }

    pub fn randomize(&mut self, rng: &mut Randomness, force_new: bool) {
        self.hour.randomize(rng, force_new);
        self.minute.randomize(rng, force_new);
        self.second.randomize(rng, force_new);
    }

    pub fn value_as_raw_string(&self) -> String {
        format!(
            "{:02}:{:02}:{:02}",
            self.hour.value, self.minute.value, self.second.value
        )
    }

    pub fn copy_value_from(&mut self, other: &TimeGene) {
        self.hour.value = other.hour.value;
        self.minute.value = other.minute.value;
        self.second.value = other.second.value;
    }

    pub fn contains_same_value_as(&self, other: &TimeGene) -> bool {
        self.hour.value == other.hour.value
            && self.minute.value == other.minute.value
            && self.second.value == other.second.value
    }

    /// Parse an `HH:MM:SS` string into the parts.
    pub fn bind_from_str(&mut self, raw: &str) -> bool {
        let parts: Vec<&str> = raw.split(':').collect();
        if parts.len() != 3 {
            return false;
        }
        let parsed: Option<(i64, i64, i64)> = (|| {
            Some((
                parts[0].parse().ok()?,
                parts[1].parse().ok()?,
                parts[2].parse().ok()?,
            ))
        })();
        match parsed {
            Some((h, m, s)) => {
                self.hour.value = h;
                self.minute.value = m;
                self.second.value = s;
                true
            }
            None => false,
        }
    }
}

/// Separator between the date and time components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateTimeFormat {
    /// `YYYY-MM-DDTHH:MM:SS`
    #[default]
    IsoLocalDateTime,
    /// `YYYY-MM-DD HH:MM:SS` (SQL timestamps)
    DefaultDateTime,
}

/// A date-time composed of a date gene and a time gene.
#[derive(Debug, Clone)]
pub struct DateTimeGene {
    pub name: String,
    pub date: DateGene,
    pub time: TimeGene,
    pub format: DateTimeFormat,
}

impl DateTimeGene {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            date: DateGene::new("date"),
            time: TimeGene::new("time"),
            format: DateTimeFormat::default(),
        }
    }

    pub fn with_format(mut self, format: DateTimeFormat) -> Self {
        self.format = format;
        self
    }

    pub fn is_locally_valid(&self) -> bool {
        self.date.is_locally_valid() && self.time.is_locally_valid()
    }

    pub fn randomize(&mut self, rng: &mut Randomness, force_new: bool) {
        self.date.randomize(rng, force_new);
        self.time.randomize(rng, force_new);
    }

    pub fn value_as_raw_string(&self) -> String {
        let sep = match self.format {
            DateTimeFormat::IsoLocalDateTime => "T",
            DateTimeFormat::DefaultDateTime => " ",
        };
        format!(
            "{}{}{}",
            self.date.value_as_raw_string(),
            sep,
            self.time.value_as_raw_string()
        )
    }

    pub fn copy_value_from(&mut self, other: &DateTimeGene) {
        self.date.copy_value_from(&other.date);
        self.time.copy_value_from(&other.time);
    }

    pub fn contains_same_value_as(&self, other: &DateTimeGene) -> bool {
        self.date.contains_same_value_as(&other.date)
            && self.time.contains_same_value_as(&other.time)
    }

    /// Parse `<date>T<time>` or `<date> <time>` into the parts.
    pub fn bind_from_str(&mut self, raw: &str) -> bool {
        let (date_part, time_part) = match raw.split_once('T').or_else(|| raw.split_once(' ')) {
            Some(pair) => pair,
            None => return false,
        };
        // Probe on copies so a half-parsable input leaves the gene untouched.
        let mut date = self.date.clone();
        let mut time = self.time.clone();
        if date.bind_from_str(date_part) && time.bind_from_str(time_part) {
            self.date = date;
            self.time = time;
            true
        } else {
            false
        }
    }
}
