// src/loader/dsp.rs

/// Append an interleaved block to planar channel staging.
pub fn append_interleaved_to_planar(
    interleaved: &[f32],
    planar: &mut [Vec<f32>],
    channels: usize,
) {
    let frames = interleaved.len() / channels;
    for f in 0..frames {
        let row = &interleaved[f * channels..(f + 1) * channels];
        for ch in 0..channels {
            planar[ch].push(row[ch]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deinterleaves_frame_major_data() {
        let mut planar = vec![Vec::new(), Vec::new()];
        append_interleaved_to_planar(&[1.0, 2.0, 3.0, 4.0], &mut planar, 2);
        assert_eq!(planar[0], vec![1.0, 3.0]);
        assert_eq!(planar[1], vec![2.0, 4.0]);
    }
}
