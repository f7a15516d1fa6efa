use crate::{Band, Product, Result};

/// Copies the product content that is not resampled itself.
///
/// The resampler calls the methods in declaration order once all bands and tie point grids
/// are part of the target product. Every method does nothing by default.
pub trait AncillaryTransfer {
    fn copy_flag_codings(&self, _source: &Product, _target: &mut Product) -> Result {
        Ok(())
    }

    fn copy_index_codings(&self, _source: &Product, _target: &mut Product) -> Result {
        Ok(())
    }

    fn copy_metadata(&self, _source: &Product, _target: &mut Product) -> Result {
        Ok(())
    }

    /// The geocoding of the target product is derived from the reference band
    fn transfer_geocoding(&self, _reference: &Band, _target: &mut Product) -> Result {
        Ok(())
    }

    fn copy_vector_data(&self, _source: &Product, _target: &mut Product) -> Result {
        Ok(())
    }

    fn copy_masks(&self, _source: &Product, _target: &mut Product) -> Result {
        Ok(())
    }

    fn copy_auto_grouping(&self, _source: &Product, _target: &mut Product) -> Result {
        Ok(())
    }
}

/// Only resamples the rasters.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAncillaryTransfer;

impl AncillaryTransfer for NoAncillaryTransfer {}

pub(crate) fn transfer_all(transfer: &dyn AncillaryTransfer, source: &Product, reference: &Band, target: &mut Product) -> Result {
    transfer.copy_flag_codings(source, target)?;
    transfer.copy_index_codings(source, target)?;
    transfer.copy_metadata(source, target)?;
    transfer.transfer_geocoding(reference, target)?;
    transfer.copy_vector_data(source, target)?;
    transfer.copy_masks(source, target)?;
    transfer.copy_auto_grouping(source, target)
}
