//! BlockIO class to OCI resource translation

use oci_spec::runtime::{
    LinuxBlockIo, LinuxThrottleDevice, LinuxThrottleDeviceBuilder, LinuxWeightDevice,
    LinuxWeightDeviceBuilder,
};
use tracing::debug;

use qosgate_core::{BlockIoClassConfig, BlockIoConfig, BlockIoDeviceConfig, Error, Result};

/// Translates a BlockIO class into the OCI block-I/O resource section
pub trait BlockIoTranslator: Send + Sync {
    /// OCI block-I/O parameters for `class`
    ///
    /// # Errors
    /// Returns [`Error::BlockIoTranslation`] if the class cannot be translated
    fn linux_block_io(&self, class: &str) -> Result<LinuxBlockIo>;
}

/// Translator backed by the BlockIO class configuration
#[derive(Debug, Clone, Default)]
pub struct ConfiguredBlockIo {
    config: BlockIoConfig,
}

impl ConfiguredBlockIo {
    /// Create a translator for the configured classes
    #[must_use]
    pub const fn new(config: BlockIoConfig) -> Self {
        Self { config }
    }

    fn translate(class: &BlockIoClassConfig) -> Result<LinuxBlockIo> {
        let mut block_io = LinuxBlockIo::default();
        block_io.set_weight(class.weight);
        block_io.set_leaf_weight(class.leaf_weight);

        let mut weights = Vec::new();
        let mut read_bps = Vec::new();
        let mut write_bps = Vec::new();
        let mut read_iops = Vec::new();
        let mut write_iops = Vec::new();

        for device in &class.devices {
            if let Some(weight) = device.weight {
                weights.push(weight_device(device, weight)?);
            }
            push_throttle(&mut read_bps, device, device.throttle_read_bps)?;
            push_throttle(&mut write_bps, device, device.throttle_write_bps)?;
            push_throttle(&mut read_iops, device, device.throttle_read_iops)?;
            push_throttle(&mut write_iops, device, device.throttle_write_iops)?;
        }

        block_io.set_weight_device(non_empty(weights));
        block_io.set_throttle_read_bps_device(non_empty(read_bps));
        block_io.set_throttle_write_bps_device(non_empty(write_bps));
        block_io.set_throttle_read_iops_device(non_empty(read_iops));
        block_io.set_throttle_write_iops_device(non_empty(write_iops));

        Ok(block_io)
    }
}

fn weight_device(device: &BlockIoDeviceConfig, weight: u16) -> Result<LinuxWeightDevice> {
    Ok(LinuxWeightDeviceBuilder::default()
        .major(device.major)
        .minor(device.minor)
        .weight(weight)
        .build()?)
}

fn push_throttle(
    out: &mut Vec<LinuxThrottleDevice>,
    device: &BlockIoDeviceConfig,
    rate: Option<u64>,
) -> Result<()> {
    if let Some(rate) = rate {
        out.push(
            LinuxThrottleDeviceBuilder::default()
                .major(device.major)
                .minor(device.minor)
                .rate(rate)
                .build()?,
        );
    }
    Ok(())
}

fn non_empty<T>(v: Vec<T>) -> Option<Vec<T>> {
    if v.is_empty() { None } else { Some(v) }
}

impl BlockIoTranslator for ConfiguredBlockIo {
    fn linux_block_io(&self, class: &str) -> Result<LinuxBlockIo> {
        let config = self
            .config
            .class(class)
            .ok_or_else(|| Error::BlockIoTranslation {
                class: class.to_string(),
                message: "class not found in BlockIO configuration".to_string(),
            })?;

        debug!(
            class,
            devices = config.devices.len(),
            "Translating BlockIO class"
        );

        Self::translate(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translator() -> ConfiguredBlockIo {
        let mut sda = BlockIoDeviceConfig::new(8, 0);
        sda.weight = Some(80);
        sda.throttle_read_bps = Some(1_048_576);
        sda.throttle_write_iops = Some(100);

        ConfiguredBlockIo::new(BlockIoConfig::enabled(vec![
            BlockIoClassConfig::new("slowreader")
                .with_weight(50)
                .with_device(sda),
            BlockIoClassConfig::new("plain"),
        ]))
    }

    #[test]
    fn test_translate_class() {
        let block_io = translator().linux_block_io("slowreader").unwrap();
        let json = serde_json::to_value(&block_io).unwrap();

        assert_eq!(json["weight"], 50);
        assert!(json["leafWeight"].is_null());
        assert_eq!(json["weightDevice"][0]["major"], 8);
        assert_eq!(json["weightDevice"][0]["weight"], 80);
        assert_eq!(json["throttleReadBpsDevice"][0]["rate"], 1_048_576);
        assert!(json["throttleWriteBpsDevice"].is_null());
        assert_eq!(json["throttleWriteIopsDevice"][0]["rate"], 100);
    }

    #[test]
    fn test_translate_plain_class() {
        let block_io = translator().linux_block_io("plain").unwrap();
        assert_eq!(block_io, LinuxBlockIo::default());
    }

    #[test]
    fn test_unknown_class() {
        let err = translator().linux_block_io("missing").unwrap_err();
        assert!(matches!(err, Error::BlockIoTranslation { .. }));
    }
}
