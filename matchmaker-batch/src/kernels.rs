//! Run detection along the round axis
//!
//! A 2-tap difference kernel `[-1, +1]` slides over each zero-padded mask
//! row. Output `+1` at position `t` marks a run starting at round `t`,
//! `-1` marks a run ending just before round `t`.

use ndarray::{s, Array2, ArrayView1, ArrayView2, Axis, Zip};

/// Difference kernel taps, applied as `taps[0] * x[t] + taps[1] * x[t + 1]`
pub const EDGE_KERNEL: [i8; 2] = [-1, 1];

/// Convolve each row of a 0/1 mask with `EDGE_KERNEL`
///
/// Input shape `(rows, rounds)`, output shape `(rows, rounds + 1)`.
pub fn edges(mask: ArrayView2<u8>) -> Array2<i8> {
    let (rows, rounds) = mask.dim();
    let mut padded = Array2::<i8>::zeros((rows, rounds + 2));
    Zip::from(padded.slice_mut(s![.., 1..rounds + 1]))
        .and(&mask)
        .for_each(|p, &m| *p = m as i8);

    let left = padded.slice(s![.., ..rounds + 1]);
    let right = padded.slice(s![.., 1..]);
    let mut out = Array2::<i8>::zeros((rows, rounds + 1));
    Zip::from(&mut out)
        .and(&left)
        .and(&right)
        .for_each(|o, &l, &r| *o = EDGE_KERNEL[0] * l + EDGE_KERNEL[1] * r);
    out
}

/// Run lengths of one edge row, in round order
pub fn run_lengths(edge_row: ArrayView1<i8>) -> Vec<u32> {
    let mut runs = Vec::new();
    let mut start = 0usize;
    for (t, &e) in edge_row.iter().enumerate() {
        match e {
            1 => start = t,
            -1 => runs.push((t - start) as u32),
            _ => {}
        }
    }
    runs
}

/// Played-run and break-run lengths for every row of a presence mask
pub fn sessions_and_breaks(mask: ArrayView2<u8>) -> (Vec<Vec<u32>>, Vec<Vec<u32>>) {
    let complement = mask.mapv(|m| 1 - m);
    let played = edges(mask);
    let idle = edges(complement.view());

    let sessions = played.axis_iter(Axis(0)).map(run_lengths).collect();
    let breaks = idle.axis_iter(Axis(0)).map(run_lengths).collect();
    (sessions, breaks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_edges_mark_starts_and_ends() {
        let mask = array![[1u8, 1, 0, 1]];
        let e = edges(mask.view());
        assert_eq!(e.row(0).to_vec(), vec![1, 0, -1, 1, -1]);
    }

    #[test]
    fn test_run_lengths_match_scalar_helper() {
        let rows: [[u8; 6]; 4] = [
            [1, 1, 0, 1, 0, 0],
            [0, 0, 0, 0, 0, 0],
            [1, 1, 1, 1, 1, 1],
            [0, 1, 0, 1, 0, 1],
        ];
        let mask = Array2::from_shape_fn((4, 6), |(r, c)| rows[r][c]);
        let (sessions, breaks) = sessions_and_breaks(mask.view());

        for (r, row) in rows.iter().enumerate() {
            let played: Vec<bool> = row.iter().map(|&m| m == 1).collect();
            assert_eq!(sessions[r], matchmaker_stats::numeric::run_lengths(&played, true));
            assert_eq!(breaks[r], matchmaker_stats::numeric::run_lengths(&played, false));
        }
    }

    #[test]
    fn test_empty_round_axis() {
        let mask = Array2::<u8>::zeros((3, 0));
        let (sessions, breaks) = sessions_and_breaks(mask.view());
        assert!(sessions.iter().all(|s| s.is_empty()));
        assert!(breaks.iter().all(|b| b.is_empty()));
    }
}
