use meterlink_core::config::{FlowCfg, TimingCfg};
use meterlink_core::{CurrentSense, PulseCounter, UsageAggregator, is_over};
use proptest::prelude::*;

proptest! {
    /// The transfer function matches the closed-form formula over the full
    /// converter range, bit for bit.
    #[test]
    fn voltage_matches_transfer_function(raw in 0u16..1024) {
        let sense = CurrentSense::default();
        let sig = sense.convert(raw);
        let expected = (i32::from(raw) - 24) as f32 * (5.0 / 1024.0) - 2.5;
        prop_assert_eq!(sig.voltage_v, expected);
        prop_assert_eq!(sig.current_a, expected / 0.066);
    }

    /// Derived power never goes negative, whatever the raw sample.
    #[test]
    fn power_is_never_negative(raw in any::<u16>()) {
        let sig = CurrentSense::default().convert(raw);
        prop_assert!(sig.power_w() >= 0.0);
    }

    /// Cumulative totals never decrease, for any tick schedule and any
    /// interleaving of pulse edges.
    #[test]
    fn totals_are_monotonic(
        steps in prop::collection::vec((1u64..2500, 0u32..500, 0u16..1024), 1..64)
    ) {
        let counter = PulseCounter::new();
        let mut agg = UsageAggregator::new(
            &FlowCfg::default(),
            &TimingCfg::default(),
            counter.clone(),
            0,
        );
        let sense = CurrentSense::default();

        let mut now_ms = 0u64;
        let (mut last_power, mut last_volume) = agg.totals();
        for (advance, edges, raw) in steps {
            for _ in 0..edges {
                counter.on_edge();
            }
            now_ms += advance;
            let m = agg.tick(now_ms, &sense.convert(raw));
            prop_assert!(m.power_total_w >= last_power);
            prop_assert!(m.volume_total_ml >= last_volume);
            last_power = m.power_total_w;
            last_volume = m.volume_total_ml;
        }
    }

    /// Threshold comparison is boundary-inclusive and total-ordered: any
    /// value at or above the threshold fires, anything below does not.
    #[test]
    fn threshold_check_is_boundary_inclusive(total in 0.0f64..1e6, threshold in 0.0f64..1e6) {
        prop_assert_eq!(is_over(total, threshold), total >= threshold);
    }
}
