use chrono::NaiveDate;

/// Default per-session daily request budget.
pub const DAILY_LIMIT: u32 = 50;

/// Inputs longer than this are truncated before any external call.
pub const MAX_INPUT_CHARS: usize = 4000;

/// Appended to truncated input so the cut is visible to the model and user.
pub const TRUNCATION_MARKER: &str = "\n\n[Truncated for length]";

/// Per-session request counter with a fixed daily limit. Checked before any
/// external call; rolling into a new calendar day resets the count.
#[derive(Debug)]
pub struct UsageGuard {
    used: u32,
    limit: u32,
    day: NaiveDate,
}

impl UsageGuard {
    pub fn new(limit: u32) -> Self {
        Self::starting_on(limit, today())
    }

    pub fn starting_on(limit: u32, day: NaiveDate) -> Self {
        UsageGuard {
            used: 0,
            limit,
            day,
        }
    }

    /// Charge one request. Returns false (and charges nothing) once the
    /// day's budget is spent.
    pub fn try_acquire(&mut self) -> bool {
        self.try_acquire_on(today())
    }

    pub fn try_acquire_on(&mut self, now: NaiveDate) -> bool {
        if now != self.day {
            self.day = now;
            self.used = 0;
        }
        if self.used >= self.limit {
            return false;
        }
        self.used += 1;
        true
    }

    pub fn reset(&mut self) {
        self.used = 0;
    }

    pub fn used(&self) -> u32 {
        self.used
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Trim the statement and cap it at MAX_INPUT_CHARS characters, appending a
/// visible marker when anything was cut. Char-based so multi-byte input is
/// never split mid-character.
pub fn truncate_input(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.chars().count() <= MAX_INPUT_CHARS {
        return trimmed.to_string();
    }

    let mut capped: String = trimmed.chars().take(MAX_INPUT_CHARS).collect();
    capped.push_str(TRUNCATION_MARKER);
    capped
}
