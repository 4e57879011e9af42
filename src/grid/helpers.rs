pub(crate) mod test_helpers {
    macro_rules! assert_almost_eq {
        ($a1:expr, $a2:expr, $d:expr) => {
            if $a1 - $a2 > $d || $a2 - $a1 > $d {
                panic!("{} and {} differ by more than {}", $a1, $a2, $d);
            }
        };
    }
    pub(crate) use assert_almost_eq;

    macro_rules! test_assert_almost_eq {
        ($((
            $name:ident,
            $a1:expr,
            $a2:expr,
            $d:expr,
            $panics:expr
        ),)*) => ($(
            #[test]
            fn $name() {
                let result = std::panic::catch_unwind(|| assert_almost_eq!($a1, $a2, $d));
                assert_eq!(result.is_err(), $panics);
            }
        )*);
    }

    test_assert_almost_eq! {
        (assert_almost_eq_accepts_close_values, 1.01, 1.02, 0.1, false),
        (assert_almost_eq_accepts_values_across_zero, -0.01, 0.01, 0.1, false),
        (assert_almost_eq_rejects_distant_values, 1.02, 1.01, 0.001, true),
        (assert_almost_eq_rejects_distant_negative_values, -1.01, -1.02, 0.001, true),
    }

    /// Returns a 42-octet grid description with the common octets filled in
    /// and the projection sub-block zeroed.
    pub(crate) fn gds_payload(projection_type: u8, nx: u16, ny: u16, scanning_mode: u8) -> Vec<u8> {
        let mut gds = vec![0u8; 42];
        gds[2] = 42;
        gds[3] = 0;
        gds[4] = 255;
        gds[5] = projection_type;
        gds[6..8].copy_from_slice(&nx.to_be_bytes());
        gds[8..10].copy_from_slice(&ny.to_be_bytes());
        gds[27] = scanning_mode;
        gds
    }

    /// Encodes degrees as a 3-octet sign-magnitude millidegree value.
    pub(crate) fn lat_lon_octets(deg: f64) -> [u8; 3] {
        let millis = (deg.abs() * 1000.0).round() as u32;
        let [_, b1, b2, b3] = millis.to_be_bytes();
        let sign = if deg < 0.0 { 0x80 } else { 0 };
        [b1 | sign, b2, b3]
    }
}
