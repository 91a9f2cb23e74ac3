//! Scores whether a filename looks like a Touchstone file.
//! Deliberately shallow: real Touchstone content sniffing is out of
//! scope for this layer.

/// Confidence out of 100 that `filename` names a Touchstone file.
/// `.s1p` through `.s8p` score 10; anything else scores 0.
pub fn match_filename(filename: &str) -> u8 {
    let lower = filename.to_ascii_lowercase();
    let Some(ext) = lower.rsplit('.').next() else {
        return 0;
    };
    if is_snp_extension(ext) {
        10
    } else {
        0
    }
}

fn is_snp_extension(ext: &str) -> bool {
    let Some(digits) = ext
        .strip_prefix('s')
        .and_then(|rest| rest.strip_suffix('p'))
    else {
        return false;
    };
    matches!(digits.parse::<u32>(), Ok(n) if (1..=8).contains(&n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scores_s1p_through_s8p() {
        for n in 1..=8 {
            assert_eq!(match_filename(&format!("device.s{n}p")), 10);
        }
    }

    #[test]
    fn is_case_insensitive() {
        assert_eq!(match_filename("DEVICE.S2P"), 10);
    }

    #[test]
    fn rejects_out_of_range_port_count() {
        assert_eq!(match_filename("device.s9p"), 0);
        assert_eq!(match_filename("device.s0p"), 0);
    }

    #[test]
    fn rejects_unrelated_extensions() {
        assert_eq!(match_filename("device.txt"), 0);
        assert_eq!(match_filename("device.ts"), 0);
        assert_eq!(match_filename("noextension"), 0);
    }
}
