//! Arc-length reparameterization.
//!
//! Cubic bases are not constant-speed in their raw parameter, so a uniform
//! arc-length parameter in [0, 1] must be converted back to (segment, local
//! parameter) through a precomputed table. The table is rebuilt in full
//! whenever points, accuracy, topology, or basis change; it is never patched
//! incrementally.

/// A raw interpolation parameter resolved to its segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentParameter {
    /// Index of the segment's first control point.
    pub first_node: usize,
    /// Raw parameter in [0, 1] within the segment.
    pub local: f64,
}

/// Piecewise-linear map between normalized arc length and raw parameter.
#[derive(Debug, Clone, Default)]
pub struct ArcLengthTable {
    /// Normalized length of each sample sub-interval; sums to 1.
    sub_lengths: Vec<f64>,
    /// Prefix sums; `sub_lengths.len() + 1` entries, first 0, last 1.
    cumulative: Vec<f64>,
    /// Normalized arc-length position of each control point.
    node_position: Vec<f64>,
    /// Normalized arc length from each control point to the next.
    node_length: Vec<f64>,
    /// Total curve length in model units.
    total_length: f64,
    accuracy: usize,
    nodes_per_segment: usize,
    /// First-node index of the final segment; parameters at or past 1 clamp
    /// here.
    max_first_node: usize,
}

impl ArcLengthTable {
    /// Measure every segment and build the lookup arrays.
    ///
    /// `speed(first_node, t)` must return the magnitude of the curve's first
    /// derivative at raw parameter `t` within the segment starting at
    /// `first_node`. Each of the `accuracy` sub-intervals per segment is
    /// measured with Simpson's rule over three speed samples.
    pub fn build<F>(
        segment_count: usize,
        accuracy: usize,
        nodes_per_segment: usize,
        node_count: usize,
        closed: bool,
        mut speed: F,
    ) -> Self
    where
        F: FnMut(usize, f64) -> f64,
    {
        debug_assert!(accuracy >= 1);

        if segment_count == 0 || node_count == 0 {
            return Self::default();
        }

        let sub_count = segment_count * accuracy;
        let inv_accuracy = 1.0 / accuracy as f64;

        let mut sub_lengths = vec![0.0; sub_count];
        let mut total_length = 0.0;

        for seg in 0..segment_count {
            let first_node = seg * nodes_per_segment;
            for j in 0..accuracy {
                let a = j as f64 * inv_accuracy;
                let b = (j + 1) as f64 * inv_accuracy;
                let mid = 0.5 * (a + b);

                let len =
                    (speed(first_node, a) + 4.0 * speed(first_node, mid) + speed(first_node, b))
                        * (b - a)
                        / 6.0;

                sub_lengths[seg * accuracy + j] = len;
                total_length += len;
            }
        }

        // Coincident points give a zero-length curve; skip normalization so
        // the arrays stay at zero instead of turning into NaN.
        let mut cumulative = vec![0.0; sub_count + 1];
        if total_length > 0.0 {
            let inv_total = 1.0 / total_length;
            for i in 0..sub_count {
                sub_lengths[i] *= inv_total;
                cumulative[i + 1] = cumulative[i] + sub_lengths[i];
            }
        }

        let (node_position, node_length) = Self::build_node_positions(
            &sub_lengths,
            accuracy,
            nodes_per_segment,
            node_count,
            closed,
        );

        Self {
            sub_lengths,
            cumulative,
            node_position,
            node_length,
            total_length,
            accuracy,
            nodes_per_segment,
            max_first_node: (segment_count - 1) * nodes_per_segment,
        }
    }

    fn build_node_positions(
        sub_lengths: &[f64],
        accuracy: usize,
        nodes_per_segment: usize,
        node_count: usize,
        closed: bool,
    ) -> (Vec<f64>, Vec<f64>) {
        let mut node_length = vec![0.0; node_count];
        let mut node_position = vec![0.0; node_count];

        for (i, len) in sub_lengths.iter().enumerate() {
            let node = (i / accuracy) * nodes_per_segment;
            if node < node_count {
                node_length[node] += len;
            }
        }

        let mut i = 0;
        while i + nodes_per_segment < node_count {
            node_position[i + nodes_per_segment] = node_position[i] + node_length[i];
            i += nodes_per_segment;
        }

        // Bézier interior nodes sit on their segment start.
        if nodes_per_segment == 3 {
            let mut i = 0;
            while i + nodes_per_segment < node_count {
                node_position[i + 1] = node_position[i];
                node_position[i + 2] = node_position[i];
                i += nodes_per_segment;
            }
        }

        if !closed {
            node_position[node_count - 1] = 1.0;
        }

        (node_position, node_length)
    }

    /// Whether the table holds no segments (degenerate curve).
    pub fn is_empty(&self) -> bool {
        self.sub_lengths.is_empty()
    }

    /// Total curve length in model units.
    pub fn total_length(&self) -> f64 {
        self.total_length
    }

    pub fn cumulative(&self) -> &[f64] {
        &self.cumulative
    }

    pub fn sub_lengths(&self) -> &[f64] {
        &self.sub_lengths
    }

    /// Normalized arc-length position of control point `i`.
    pub fn node_position(&self, i: usize) -> f64 {
        self.node_position[i]
    }

    /// Normalized arc length from control point `i` to the next node.
    pub fn node_length(&self, i: usize) -> f64 {
        self.node_length[i]
    }

    pub fn node_positions(&self) -> &[f64] {
        &self.node_position
    }

    pub fn node_lengths(&self) -> &[f64] {
        &self.node_length
    }

    pub fn max_first_node(&self) -> usize {
        self.max_first_node
    }

    /// Convert a normalized arc-length parameter to (segment, raw local
    /// parameter).
    ///
    /// Parameters at or below 0 resolve to the curve start, at or above 1 to
    /// the end of the final segment. In between, a binary search over the
    /// cumulative array brackets `cum[i] <= param < cum[i+1]`, and the local
    /// parameter interpolates linearly inside that sub-interval.
    pub fn locate(&self, param: f64) -> SegmentParameter {
        if self.is_empty() {
            return SegmentParameter {
                first_node: 0,
                local: param.clamp(0.0, 1.0),
            };
        }

        if param <= 0.0 {
            return SegmentParameter {
                first_node: 0,
                local: 0.0,
            };
        }
        if param >= 1.0 {
            return SegmentParameter {
                first_node: self.max_first_node,
                local: 1.0,
            };
        }

        let cum = &self.cumulative;
        let mut low: i64 = 0;
        let mut high: i64 = cum.len() as i64 - 2;

        while low <= high {
            let mid = (low + ((high - low) >> 1)) as usize;
            if cum[mid + 1] <= param {
                low = mid as i64 + 1;
            } else if cum[mid] > param {
                high = mid as i64 - 1;
            } else {
                let floor = mid - mid % self.accuracy;
                let first_node = (floor / self.accuracy) * self.nodes_per_segment;

                if first_node > self.max_first_node {
                    break;
                }

                let inv_accuracy = 1.0 / self.accuracy as f64;
                let local = inv_accuracy
                    * ((mid - floor) as f64 + (param - cum[mid]) / self.sub_lengths[mid]);

                return SegmentParameter { first_node, local };
            }
        }

        // Zero-length curves and accumulated rounding at the tail both land
        // here: clamp to the end of the final segment.
        SegmentParameter {
            first_node: self.max_first_node,
            local: 1.0,
        }
    }
}
