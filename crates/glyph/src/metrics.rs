use tracing::debug;

use crate::{
    config::PipelineConfig,
    types::{GlyphMetrics, InkMask},
};

/// Advance width from the rightmost ink column plus a fixed margin
#[derive(Debug, Clone)]
pub struct MetricsEstimator {
    /// Font units per pixel
    pub scale: f64,
    /// Spacing in pixels added after the last ink column
    pub right_margin: u32,
    /// Floor for every advance, in font units
    pub min_advance: u32,
}

impl MetricsEstimator {
    pub fn new(scale: f64, right_margin: u32, min_advance: u32) -> Self {
        Self {
            scale,
            right_margin,
            min_advance,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.scale(), config.right_margin, config.min_advance)
    }

    pub fn estimate(&self, mask: &InkMask) -> GlyphMetrics {
        let Some(extent) = mask.ink_extent() else {
            debug!(advance_width = self.min_advance, "blank glyph, using advance floor");
            return GlyphMetrics {
                advance_width: self.min_advance,
            };
        };

        let advance =
            ((f64::from(extent.max_column) + f64::from(self.right_margin)) * self.scale).round();
        GlyphMetrics {
            advance_width: (advance.max(0.0) as u32).max(self.min_advance),
        }
    }
}

impl Default for MetricsEstimator {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}
