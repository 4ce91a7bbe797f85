//! Offsets into a video and intervals between them.
//!
//! A [`TimePoint`] is an hours/minutes/seconds/milliseconds offset. Values may be
//! handed in unnormalized (90 seconds, 1500 milliseconds) and are carried upward
//! into the larger units on construction and after every adjustment. Hours are
//! never capped.
//!
//! # Negative adjustments
//!
//! Normalization only carries upward. Subtracting more than the current value of a
//! component leaves that component negative; the total offset reported by
//! [`TimePoint::in_milliseconds`] is still arithmetically correct, but the
//! component accessors will show the unborrowed value.

use std::cmp::Ordering;
use std::fmt;

const MS_PER_SECOND: i64 = 1000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;

/// An offset into a video.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimePoint {
    hours: i64,
    minutes: i64,
    seconds: i64,
    milliseconds: i64,
}

impl TimePoint {
    /// Creates a time point from raw components and normalizes it.
    pub fn new(hours: i64, minutes: i64, seconds: i64, milliseconds: i64) -> Self {
        let mut point = Self {
            hours,
            minutes,
            seconds,
            milliseconds,
        };
        point.normalize();
        point
    }

    /// Creates a time point from a total offset in milliseconds.
    pub fn from_millis(milliseconds: i64) -> Self {
        Self::new(0, 0, 0, milliseconds)
    }

    /// Creates a time point from a total offset in seconds.
    pub fn from_seconds(seconds: i64) -> Self {
        Self::new(0, 0, seconds, 0)
    }

    /// Carries milliseconds into seconds, seconds into minutes and minutes into
    /// hours. Hours are left alone.
    pub const fn normalize(&mut self) {
        if self.milliseconds >= MS_PER_SECOND {
            self.seconds += self.milliseconds / MS_PER_SECOND;
            self.milliseconds %= MS_PER_SECOND;
        }
        if self.seconds >= 60 {
            self.minutes += self.seconds / 60;
            self.seconds %= 60;
        }
        if self.minutes >= 60 {
            self.hours += self.minutes / 60;
            self.minutes %= 60;
        }
    }

    pub const fn hours(&self) -> i64 {
        self.hours
    }

    pub const fn minutes(&self) -> i64 {
        self.minutes
    }

    pub const fn seconds(&self) -> i64 {
        self.seconds
    }

    pub const fn milliseconds(&self) -> i64 {
        self.milliseconds
    }

    /// Whole seconds of the offset; the millisecond component is dropped.
    pub const fn in_seconds(&self) -> i64 {
        self.hours * 3600 + self.minutes * 60 + self.seconds
    }

    pub const fn in_milliseconds(&self) -> i64 {
        self.hours * MS_PER_HOUR
            + self.minutes * MS_PER_MINUTE
            + self.seconds * MS_PER_SECOND
            + self.milliseconds
    }

    /// Adds `delta` seconds and normalizes.
    pub const fn adjust_seconds(&mut self, delta: i64) {
        self.seconds += delta;
        self.normalize();
    }

    /// Adds `delta` milliseconds and normalizes.
    pub const fn adjust_milliseconds(&mut self, delta: i64) {
        self.milliseconds += delta;
        self.normalize();
    }

    pub fn hh(&self) -> String {
        format!("{:02}", self.hours)
    }

    pub fn mm(&self) -> String {
        format!("{:02}", self.minutes)
    }

    pub fn ss(&self) -> String {
        format!("{:02}", self.seconds)
    }

    pub fn mmm(&self) -> String {
        format!("{:03}", self.milliseconds)
    }

    /// `HH:MM:SS.mmm`
    pub fn timestamp(&self) -> String {
        format!("{}:{}:{}.{}", self.hh(), self.mm(), self.ss(), self.mmm())
    }

    /// `MM:SS.mmm`, used where hours are known to be zero.
    pub fn short_timestamp(&self) -> String {
        format!("{}:{}.{}", self.mm(), self.ss(), self.mmm())
    }
}

impl PartialEq for TimePoint {
    fn eq(&self, other: &Self) -> bool {
        self.in_milliseconds() == other.in_milliseconds()
    }
}

impl Eq for TimePoint {}

impl PartialOrd for TimePoint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimePoint {
    fn cmp(&self, other: &Self) -> Ordering {
        self.in_milliseconds().cmp(&other.in_milliseconds())
    }
}

impl fmt::Display for TimePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.timestamp())
    }
}

/// A start and end offset.
///
/// `start <= end` is not enforced here; annotations check it when they are
/// validated. Cloning produces independent time points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeFrame {
    pub start: TimePoint,
    pub end: TimePoint,
}

impl TimeFrame {
    pub const fn new(start: TimePoint, end: TimePoint) -> Self {
        Self { start, end }
    }

    /// Creates a frame from two offsets in milliseconds.
    pub fn from_millis(start: i64, end: i64) -> Self {
        Self::new(TimePoint::from_millis(start), TimePoint::from_millis(end))
    }

    /// Length in whole seconds, never negative.
    pub fn length(&self) -> i64 {
        (self.end.in_seconds() - self.start.in_seconds()).max(0)
    }

    /// Half-open overlap: frames that only touch at a boundary do not overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        !(self.end <= other.start || other.end <= self.start)
    }

    /// Moves the start by `delta` milliseconds.
    pub const fn adjust_start(&mut self, delta: i64) {
        self.start.adjust_milliseconds(delta);
    }

    /// Moves the end by `delta` milliseconds.
    pub const fn adjust_end(&mut self, delta: i64) {
        self.end.adjust_milliseconds(delta);
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ==> {}  [length={}]",
            self.start,
            self.end,
            self.length()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_carries_upward() {
        let tp = TimePoint::new(1, 75, 130, 2500);
        assert_eq!(tp.hours(), 2);
        assert_eq!(tp.minutes(), 17);
        assert_eq!(tp.seconds(), 12);
        assert_eq!(tp.milliseconds(), 500);
    }

    #[test]
    fn in_milliseconds_matches_naive_expansion() {
        for (h, m, s, ms) in [(0, 0, 0, 0), (1, 2, 3, 4), (0, 59, 59, 999), (3, 120, 61, 1001)] {
            let tp = TimePoint::new(h, m, s, ms);
            assert_eq!(
                tp.in_milliseconds(),
                h * 3_600_000 + m * 60_000 + s * 1000 + ms
            );
            assert!((0..1000).contains(&tp.milliseconds()));
            assert!((0..60).contains(&tp.seconds()));
            assert!((0..60).contains(&tp.minutes()));
        }
    }

    #[test]
    fn hours_are_unbounded() {
        let tp = TimePoint::new(0, 60 * 30, 0, 0);
        assert_eq!(tp.hours(), 30);
        assert_eq!(tp.minutes(), 0);
    }

    #[test]
    fn ordering_uses_total_offset() {
        let a = TimePoint::new(0, 1, 0, 0);
        let b = TimePoint::new(0, 0, 60, 0);
        let c = TimePoint::from_millis(60_001);
        assert_eq!(a, b);
        assert!(a < c);
        assert!(c > b);
    }

    #[test]
    fn adjust_milliseconds_renormalizes() {
        let mut tp = TimePoint::new(0, 0, 59, 900);
        tp.adjust_milliseconds(250);
        assert_eq!(tp.minutes(), 1);
        assert_eq!(tp.seconds(), 0);
        assert_eq!(tp.milliseconds(), 150);
    }

    #[test]
    fn adjust_seconds_renormalizes() {
        let mut tp = TimePoint::new(0, 59, 30, 0);
        tp.adjust_seconds(45);
        assert_eq!(tp.hours(), 1);
        assert_eq!(tp.minutes(), 0);
        assert_eq!(tp.seconds(), 15);
    }

    #[test]
    fn negative_adjustment_does_not_borrow() {
        let mut tp = TimePoint::new(0, 0, 1, 100);
        tp.adjust_milliseconds(-200);
        assert_eq!(tp.seconds(), 1);
        assert_eq!(tp.milliseconds(), -100);
        assert_eq!(tp.in_milliseconds(), 900);
    }

    #[test]
    fn timestamps_are_zero_padded() {
        let tp = TimePoint::new(0, 3, 7, 45);
        assert_eq!(tp.timestamp(), "00:03:07.045");
        assert_eq!(tp.short_timestamp(), "03:07.045");
    }

    #[test]
    fn length_is_never_negative() {
        let frame = TimeFrame::from_millis(5000, 2000);
        assert_eq!(frame.length(), 0);
        let frame = TimeFrame::from_millis(2000, 5500);
        assert_eq!(frame.length(), 3);
    }

    #[test]
    fn boundary_touching_frames_do_not_overlap() {
        let a = TimeFrame::from_millis(0, 1000);
        let b = TimeFrame::from_millis(1000, 2000);
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn overlap_is_symmetric() {
        let frames = [
            TimeFrame::from_millis(0, 1500),
            TimeFrame::from_millis(1000, 2000),
            TimeFrame::from_millis(2000, 2000),
            TimeFrame::from_millis(500, 700),
            TimeFrame::from_millis(3000, 4000),
        ];
        for a in &frames {
            for b in &frames {
                assert_eq!(a.overlaps(b), b.overlaps(a), "{a} vs {b}");
            }
        }
        assert!(frames[0].overlaps(&frames[1]));
        assert!(frames[0].overlaps(&frames[3]));
    }

    #[test]
    fn copies_are_independent() {
        let original = TimeFrame::from_millis(1000, 2000);
        let mut copy = original;
        copy.adjust_start(500);
        copy.adjust_end(-500);
        assert_eq!(original.start.in_milliseconds(), 1000);
        assert_eq!(original.end.in_milliseconds(), 2000);
        assert_eq!(copy.start.in_milliseconds(), 1500);
        assert_eq!(copy.end.in_milliseconds(), 1500);
    }
}
