//! Makefile-driven parameter extraction

use super::compliance::is_allowed_makefile;
use super::sentinel::{parse_dump, parse_variants, VariantSet};
use super::{
    format_app_flags, parse_app_flags, AppDescriptor, ExtractError, ParamValue, ParameterRecord,
    APP_FLAGS_KEY, TARGET_KEY,
};
use crate::device::Device;
use crate::process::{CommandRunner, Invocation};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Fragment appended to the app Makefile to echo build parameters
pub const LISTPARAMS_MAKEFILE: &str = "
listparams:
\t@echo Start dumping params
\t@echo APP_LOAD_PARAMS=$(APP_LOAD_PARAMS)
\t@echo GLYPH_FILES=$(GLYPH_FILES)
\t@echo ICONNAME=$(ICONNAME)
\t@echo TARGET=$(TARGET)
\t@echo TARGET_NAME=$(TARGET_NAME)
\t@echo TARGET_ID=$(TARGET_ID)
\t@echo APPNAME=$(APPNAME)
\t@echo APPVERSION=$(APPVERSION)
\t@echo API_LEVEL=$(API_LEVEL)
\t@echo SDK_NAME=$(SDK_NAME)
\t@echo SDK_VERSION=$(SDK_VERSION)
\t@echo SDK_HASH=$(SDK_HASH)
\t@echo appFlags=$(APP_FLAGS_APP_LOAD_PARAMS)
\t@echo curve=$(CURVE_APP_LOAD_PARAMS)
\t@echo path=$(PATH_APP_LOAD_PARAMS)
\t@echo path_slip21=$(PATH_SLIP21_APP_LOAD_PARAMS)
\t@echo tlvraw=$(TLVRAW_APP_LOAD_PARAMS)
\t@echo dep=$(DEP_APP_LOAD_PARAMS)
\t@echo nocrc=$(ENABLE_NOCRC_APP_LOAD_PARAMS)
\t@echo Stop dumping params
";

pub struct MakefileExtractor<R: CommandRunner> {
    runner: R,
    make: String,
}

impl<R: CommandRunner> MakefileExtractor<R> {
    pub fn new(runner: R, make: impl Into<String>) -> Self {
        Self {
            runner,
            make: make.into(),
        }
    }

    pub fn list_variants(&self, build_dir: &Path) -> Result<VariantSet, ExtractError> {
        let invocation = Invocation::new(&self.make, build_dir).arg("listvariants");
        let output = self.runner.run(&invocation)?;
        Ok(parse_variants(&output)?)
    }

    /// Dumps the parameters of the variant selected by `assignment`
    /// (`SELECTOR=variant`).
    pub fn dump_params(
        &self,
        build_dir: &Path,
        assignment: &str,
    ) -> Result<ParameterRecord, ExtractError> {
        // Removed when `fragment` drops, including on error
        let mut fragment = tempfile::Builder::new()
            .prefix("listparams")
            .suffix(".mk")
            .tempfile()
            .map_err(ExtractError::Fragment)?;
        fragment
            .write_all(LISTPARAMS_MAKEFILE.as_bytes())
            .and_then(|_| fragment.flush())
            .map_err(ExtractError::Fragment)?;

        let invocation = Invocation::new(&self.make, build_dir)
            .args(["-f", "Makefile", "-f"])
            .arg(fragment.path().to_string_lossy())
            .arg("listparams")
            .arg(assignment);
        let output = self.runner.run(&invocation)?;
        drop(fragment);

        Ok(parse_dump(&output)?)
    }

    /// Builds the descriptor for every declared variant.
    ///
    /// When `device` is given, its flag rule is applied to each variant's
    /// `appFlags` and `TARGET` falls back to the device's SDK target.
    pub fn describe(
        &self,
        build_dir: &Path,
        device: Option<Device>,
    ) -> Result<AppDescriptor, ExtractError> {
        let variant_set = self.list_variants(build_dir)?;
        debug!(
            selector = %variant_set.selector,
            count = variant_set.variants.len(),
            "Variants retrieved"
        );

        let mut variants = BTreeMap::new();
        for variant in &variant_set.variants {
            info!("Checking for variant: {}", variant);
            let mut record = self.dump_params(build_dir, &variant_set.assignment(variant))?;
            if let Some(device) = device {
                apply_device(&mut record, device)?;
            }
            variants.insert(variant.clone(), record);
        }

        Ok(AppDescriptor {
            build_directory: build_dir.to_path_buf(),
            variant_param: variant_set.selector,
            variants,
            is_allowed_makefile: Some(is_allowed_makefile(build_dir)?),
        })
    }
}

fn apply_device(record: &mut ParameterRecord, device: Device) -> Result<(), ExtractError> {
    let adjusted = match record.get(APP_FLAGS_KEY) {
        Some(ParamValue::Text(flags)) => Some(device.adjust_app_flags(parse_app_flags(flags)?)),
        _ => None,
    };
    if let Some(adjusted) = adjusted {
        record.insert(
            APP_FLAGS_KEY.to_string(),
            ParamValue::text(format_app_flags(adjusted)),
        );
    }
    record
        .entry(TARGET_KEY.to_string())
        .or_insert_with(|| ParamValue::text(device.c_target()));
    Ok(())
}
