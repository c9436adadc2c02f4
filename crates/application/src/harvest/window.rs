//! Day-by-day iteration over a date range.

use chrono::NaiveDate;

/// Iterates every day of an inclusive range, once each, in order.
///
/// An inverted range yields nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateWindow {
    next: Option<NaiveDate>,
    end: NaiveDate,
}

impl DateWindow {
    /// Creates a window from `start` to `end`, both included.
    #[must_use]
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            next: (start <= end).then_some(start),
            end,
        }
    }
}

impl Iterator for DateWindow {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<Self::Item> {
        let day = self.next?;
        self.next = day.succ_opt().filter(|next| *next <= self.end);
        Some(day)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.next.map_or(0, |day| {
            usize::try_from((self.end - day).num_days() + 1).unwrap_or(0)
        });
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for DateWindow {}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_inclusive_range() {
        let days: Vec<_> = DateWindow::new(day(30), NaiveDate::from_ymd_opt(2024, 2, 2).unwrap())
            .collect();
        assert_eq!(days.len(), 4);
        assert_eq!(days[0], day(30));
        assert_eq!(days[3], NaiveDate::from_ymd_opt(2024, 2, 2).unwrap());
    }

    #[test]
    fn test_single_day() {
        let window = DateWindow::new(day(1), day(1));
        assert_eq!(window.len(), 1);
        assert_eq!(window.collect::<Vec<_>>(), vec![day(1)]);
    }

    #[test]
    fn test_inverted_range_is_empty() {
        assert_eq!(DateWindow::new(day(5), day(1)).count(), 0);
    }

    #[test]
    fn test_each_day_once() {
        let days: Vec<_> = DateWindow::new(day(1), day(31)).collect();
        assert_eq!(days.len(), 31);
        assert!(days.windows(2).all(|pair| pair[1] == pair[0].succ_opt().unwrap()));
    }
}
