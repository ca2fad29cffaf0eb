use crate::sample::RawSample;

/// MPU-6050 sensitivity at ±2 g full scale.
pub const ACCEL_LSB_PER_G: f64 = 16384.0;
/// MPU-6050 sensitivity at ±250 °/s full scale.
pub const GYRO_LSB_PER_DPS: f64 = 131.0;

/// One sample in physical units: acceleration in g, angular rate in °/s.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicalSample {
    pub ax_g: f64,
    pub ay_g: f64,
    pub az_g: f64,
    pub gx_dps: f64,
    pub gy_dps: f64,
    pub gz_dps: f64,
}

impl PhysicalSample {
    pub fn accel(&self) -> [f64; 3] {
        [self.ax_g, self.ay_g, self.az_g]
    }

    pub fn gyro(&self) -> [f64; 3] {
        [self.gx_dps, self.gy_dps, self.gz_dps]
    }
}

/// Plain linear scaling; the factors are fixed by the sensor's configured
/// full-scale range, so changing the range means changing the factor. No
/// rounding or clamping.
pub fn to_physical(sample: &RawSample, accel_scale: f64, gyro_scale: f64) -> PhysicalSample {
    PhysicalSample {
        ax_g: sample.ax / accel_scale,
        ay_g: sample.ay / accel_scale,
        az_g: sample.az / accel_scale,
        gx_dps: sample.gx / gyro_scale,
        gy_dps: sample.gy / gyro_scale,
        gz_dps: sample.gz / gyro_scale,
    }
}

pub fn convert_all(
    samples: &[RawSample],
    accel_scale: f64,
    gyro_scale: f64,
) -> Vec<PhysicalSample> {
    samples
        .iter()
        .map(|s| to_physical(s, accel_scale, gyro_scale))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(ax: f64, gz: f64) -> RawSample {
        RawSample {
            timestamp_us: 0,
            ax,
            ay: 0.0,
            az: 0.0,
            gx: 0.0,
            gy: 0.0,
            gz,
        }
    }

    #[test]
    fn one_lsb_full_scale_is_exactly_one_unit() {
        let converted = to_physical(&raw(16384.0, 131.0), ACCEL_LSB_PER_G, GYRO_LSB_PER_DPS);
        assert_eq!(converted.ax_g, 1.0);
        assert_eq!(converted.gz_dps, 1.0);
    }

    #[test]
    fn conversion_is_linear_in_the_input() {
        let half = to_physical(&raw(8192.0, -262.0), ACCEL_LSB_PER_G, GYRO_LSB_PER_DPS);
        assert_eq!(half.ax_g, 0.5);
        assert_eq!(half.gz_dps, -2.0);
    }

    #[test]
    fn custom_scales_are_honored() {
        let converted = to_physical(&raw(2048.0, 16.4), 2048.0, 16.4);
        assert_eq!(converted.ax_g, 1.0);
        assert!((converted.gz_dps - 1.0).abs() < 1e-12);
    }
}
