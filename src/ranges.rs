//! Which addresses the ABC will actually answer for, and how to group them
//! into reads.
//!
//! The board does not expose a contiguous address space. Asking for anything
//! outside the ranges below gets a refusal or garbage, so pollers construct
//! their read requests from this table rather than from the catalog alone.

use std::ops::RangeInclusive;

use crate::registers::RegisterIndex;

/// Largest register count a single read holding registers request may carry.
pub const MAX_READ_COUNT: u16 = 125;

/// An inclusive span of addresses the board is known to answer for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct AddressRange {
    pub start: u16,
    pub end: u16,
}

impl AddressRange {
    pub const fn contains(&self, address: u16) -> bool {
        self.start <= address && address <= self.end
    }

    pub const fn register_count(&self) -> u16 {
        self.end - self.start + 1
    }
}

const fn r(start: u16, end: u16) -> AddressRange {
    AddressRange { start, end }
}

// The 22xxx and 32xxx blocks repeat six times, once per IZ2 zone; they are
// structurally identical and listed out in full here.
pub static VALID_RANGES: &[AddressRange] = &[
    r(0, 155),
    r(170, 253),
    r(260, 260),
    r(280, 288),
    r(300, 301),
    r(320, 326),
    r(340, 348),
    r(360, 368),
    r(400, 419),
    r(440, 516),
    r(550, 573),
    r(600, 749),
    r(800, 913),
    r(1090, 1165),
    r(1200, 1263),
    r(2000, 2026),
    r(2100, 2129),
    r(2800, 2849),
    r(2900, 2915),
    r(2950, 2959),
    r(3000, 3003),
    r(3020, 3030),
    r(3040, 3049),
    r(3060, 3063),
    r(3100, 3105),
    r(3108, 3115),
    r(3118, 3119),
    r(3200, 3253),
    r(3300, 3332),
    r(3400, 3431),
    r(3500, 3524),
    r(3600, 3609),
    r(3618, 3634),
    r(3700, 3714),
    r(3800, 3809),
    r(3818, 3834),
    r(3900, 3914),
    r(12000, 12019),
    r(12098, 12099),
    r(12100, 12119),
    r(12200, 12239),
    r(12300, 12319),
    r(12400, 12569),
    r(12600, 12639),
    r(12700, 12799),
    r(20000, 20099),
    r(21100, 21136),
    r(21200, 21265),
    r(21400, 21472),
    r(21500, 21589),
    r(22100, 22162),
    r(22200, 22262),
    r(22300, 22362),
    r(22400, 22462),
    r(22500, 22562),
    r(22600, 22662),
    r(30000, 30099),
    r(31000, 31034),
    r(31100, 31129),
    r(31200, 31229),
    r(31300, 31329),
    r(31400, 31472),
    r(32100, 32162),
    r(32200, 32262),
    r(32300, 32362),
    r(32400, 32462),
    r(32500, 32562),
    r(32600, 32662),
    r(60050, 60053),
    r(60100, 60109),
    r(60200, 60200),
    r(61000, 61009),
];

/// Whether the board is expected to answer a read of this address.
///
/// This table and the register catalog are kept independent: nothing here
/// requires a catalog entry to fall inside a range, and most valid addresses
/// have no catalog entry yet.
pub fn is_valid(address: u16) -> bool {
    containing_range(address).is_some()
}

fn containing_range(address: u16) -> Option<usize> {
    // Ranges are sorted and non-overlapping, so they are ordered by `end`
    // just as well as by `start`.
    let index = VALID_RANGES.partition_point(|range| range.end < address);
    VALID_RANGES
        .get(index)
        .is_some_and(|range| range.contains(address))
        .then_some(index)
}

/// All valid ranges that intersect the given address span.
pub fn ranges_overlapping(span: RangeInclusive<u16>) -> &'static [AddressRange] {
    let first = VALID_RANGES.partition_point(|range| range.end < *span.start());
    let past_last = VALID_RANGES.partition_point(|range| range.start <= *span.end());
    &VALID_RANGES[first.min(past_last)..past_last]
}

/// One read holding registers request of a polling plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ReadCommand {
    pub address: u16,
    pub count: u16,
}

/// Group the catalog into as few read requests as possible.
///
/// Each read has fixed per-request overhead on the wire, so adjacent catalog
/// entries that share a containing valid range are coalesced into one request
/// of at most [`MAX_READ_COUNT`] registers. Reads never straddle a range
/// boundary, and word counts of multi-word entries are never split. Entries
/// outside every valid range get a lone single-entry read.
pub fn plan_reads() -> Vec<ReadCommand> {
    let mut plan = Vec::new();
    // (containing range, first address, last address) of the open group.
    let mut current: Option<(Option<usize>, u16, u16)> = None;
    for register in RegisterIndex::all() {
        let address = register.address();
        let last = address + register.word_count() as u16 - 1;
        let range = containing_range(address);
        current = match current {
            Some((open_range, first, open_last))
                if open_range == range
                    && range.is_some()
                    && u32::from(last) - u32::from(first) < u32::from(MAX_READ_COUNT) =>
            {
                Some((open_range, first, last.max(open_last)))
            }
            Some((_, first, open_last)) => {
                plan.push(ReadCommand { address: first, count: open_last - first + 1 });
                Some((range, address, last))
            }
            None => Some((range, address, last)),
        };
    }
    if let Some((_, first, last)) = current {
        plan.push(ReadCommand { address: first, count: last - first + 1 });
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validity_respects_inclusive_bounds_and_gaps() {
        assert!(is_valid(0));
        assert!(is_valid(92));
        assert!(is_valid(155));
        assert!(!is_valid(156));
        assert!(!is_valid(160));
        assert!(is_valid(170));
        assert!(is_valid(61000));
        assert!(is_valid(61009));
        assert!(!is_valid(61010));
    }

    #[test]
    fn overlap_query_returns_every_intersecting_range() {
        let overlapping = ranges_overlapping(150..=300);
        assert_eq!(
            overlapping,
            &[
                AddressRange { start: 0, end: 155 },
                AddressRange { start: 170, end: 253 },
                AddressRange { start: 260, end: 260 },
                AddressRange { start: 280, end: 288 },
                AddressRange { start: 300, end: 301 },
            ][..],
        );
        assert!(ranges_overlapping(156..=169).is_empty());
        assert_eq!(ranges_overlapping(92..=92).len(), 1);
    }

    #[test]
    fn plan_starts_with_the_abc_base_block() {
        let plan = plan_reads();
        // Catalog entries 0 through 112 share the 0-155 range and fit in one
        // request; the next entries live in the 170-253 and 280-288 ranges.
        assert_eq!(plan[0], ReadCommand { address: 0, count: 113 });
        assert_eq!(plan[1], ReadCommand { address: 201, count: 18 });
        assert_eq!(plan[2], ReadCommand { address: 280, count: 5 });
    }

    #[test]
    fn plan_respects_the_per_request_limit() {
        for command in plan_reads() {
            assert!(command.count <= MAX_READ_COUNT, "{command:?}");
            assert!(command.count > 0, "{command:?}");
        }
    }

    #[test]
    fn plan_never_straddles_range_boundaries() {
        for command in plan_reads() {
            let last = command.address + command.count - 1;
            if let Some(index) = containing_range(command.address) {
                assert!(VALID_RANGES[index].contains(last), "{command:?}");
            } else {
                // Stray catalog entries outside every range poll alone.
                let register = RegisterIndex::from_address(command.address).unwrap();
                assert_eq!(usize::from(command.count), register.word_count());
            }
        }
    }

    #[test]
    fn plan_covers_every_catalog_entry() {
        let plan = plan_reads();
        for register in RegisterIndex::all() {
            let address = register.address();
            let last = address + register.word_count() as u16 - 1;
            assert!(
                plan.iter().any(|command| command.address <= address
                    && last <= command.address + command.count - 1),
                "register {address} is not covered",
            );
        }
    }
}
