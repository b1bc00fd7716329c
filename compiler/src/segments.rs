//! Auxiliary-input segment accounting.

use tracing::debug;

use crate::error::CompileError;

/// Fix up the declared segment sizes after compilation.
///
/// The gate list cannot know how many intermediate variables compilation will
/// allocate, so the last segment is recomputed to take every auxiliary
/// variable the other segments do not claim. Returns the sizes unchanged when
/// no segments were declared. `line` locates the `num_segments` directive in
/// errors.
pub fn finalize_segments(
    line: usize,
    declared: &[usize],
    num_variables: usize,
    primary_input_size: usize,
) -> Result<Vec<usize>, CompileError> {
    let Some((&declared_last, leading)) = declared.split_last() else {
        return Ok(Vec::new());
    };

    let available = num_variables.saturating_sub(primary_input_size);
    let claimed: usize = leading.iter().sum();
    let last = available
        .checked_sub(claimed)
        .ok_or(CompileError::SegmentOverflow {
            line,
            declared: claimed,
            available,
        })?;

    debug!(
        declared = declared_last,
        resolved = last,
        "resized last segment"
    );
    let mut sizes = leading.to_vec();
    sizes.push(last);
    Ok(sizes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_segment_absorbs_remainder() {
        let sizes = finalize_segments(2, &[4, 3, 0], 20, 5).unwrap();
        assert_eq!(sizes, vec![4, 3, 8]);
        assert_eq!(sizes.iter().sum::<usize>(), 20 - 5);
    }

    #[test]
    fn test_single_segment() {
        assert_eq!(finalize_segments(2, &[100], 10, 3).unwrap(), vec![7]);
    }

    #[test]
    fn test_no_segments() {
        assert!(finalize_segments(0, &[], 10, 3).unwrap().is_empty());
    }

    #[test]
    fn test_overflow() {
        assert!(matches!(
            finalize_segments(7, &[6, 5, 1], 12, 2),
            Err(CompileError::SegmentOverflow {
                line: 7,
                declared: 11,
                available: 10
            })
        ));
    }
}
