//! Compact duration labels: the two largest units, rounded, e.g. `1m 30s`.

use chrono::TimeDelta;

struct Unit {
    label: &'static str,
    ms: u64,
}

const UNITS: [Unit; 8] = [
    Unit { label: "y", ms: 31_557_600_000 },
    Unit { label: "mo", ms: 2_629_800_000 },
    Unit { label: "w", ms: 604_800_000 },
    Unit { label: "d", ms: 86_400_000 },
    Unit { label: "h", ms: 3_600_000 },
    Unit { label: "m", ms: 60_000 },
    Unit { label: "s", ms: 1_000 },
    Unit { label: "ms", ms: 1 },
];

pub fn humanize(delta: TimeDelta) -> String {
    humanize_ms(delta.num_milliseconds())
}

/// Negative durations clamp to zero.
pub fn humanize_ms(ms: i64) -> String {
    let mut total = ms.max(0).unsigned_abs();
    loop {
        let Some(lead) = UNITS.iter().position(|unit| total >= unit.ms) else {
            return "0ms".to_string();
        };
        let first = &UNITS[lead];
        let Some(second) = UNITS.get(lead + 1) else {
            return format!("{total}{}", first.label);
        };

        let rounded = (total + second.ms / 2) / second.ms * second.ms;
        // Rounding can carry into a larger unit; start over from there.
        if lead > 0 && rounded >= UNITS[lead - 1].ms {
            total = rounded;
            continue;
        }

        let major = rounded / first.ms;
        let minor = (rounded % first.ms) / second.ms;
        return if minor == 0 {
            format!("{major}{}", first.label)
        } else {
            format!("{major}{} {minor}{}", first.label, second.label)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_largest_units() {
        assert_eq!(humanize_ms(90_000), "1m 30s");
        assert_eq!(humanize_ms(3_723_000), "1h 2m");
        assert_eq!(humanize(TimeDelta::seconds(42)), "42s");
        assert_eq!(humanize(TimeDelta::days(9)), "1w 2d");
    }

    #[test]
    fn small_values() {
        assert_eq!(humanize_ms(0), "0ms");
        assert_eq!(humanize_ms(-5), "0ms");
        assert_eq!(humanize_ms(250), "250ms");
        assert_eq!(humanize_ms(1_500), "1s 500ms");
    }

    #[test]
    fn rounds_the_smaller_unit() {
        assert_eq!(humanize_ms(61_600), "1m 2s");
        assert_eq!(humanize_ms(119_700), "2m");
    }

    #[test]
    fn rounding_carries_into_the_next_unit() {
        // 59m 59.6s rounds to 60m, shown as one hour.
        assert_eq!(humanize_ms(3_599_600), "1h");
    }
}
