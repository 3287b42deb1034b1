//! Main integration module for NNRT
//!
//! This module ties the configuration, logging and inference-engine crates
//! together behind [`Runtime`], the entry point an embedding application
//! uses to build variables and drive functions.

use std::path::Path;

use tracing::{debug, info};

use common::error::Result;
use inference_engine::{
    DataRepresentation, Function, FunctionState, Shape, Variable, VariableRef,
};
use runtime_config::{ConfigValidator, EngineConfig, RuntimeConfig};

pub use common;
pub use inference_engine;
pub use runtime_config;

/// Configured runtime
#[derive(Debug, Clone)]
pub struct Runtime {
    /// Validated configuration
    config: RuntimeConfig,
}

impl Runtime {
    /// Validates `config` and installs logging
    pub fn new(config: RuntimeConfig) -> Result<Self> {
        ConfigValidator::validate(&config)?;
        logging::init(&config.log)?;

        info!(
            "Initialized NNRT runtime (dispatch {}, fixed-point position {})",
            config.engine.dispatch, config.engine.default_fixed_point_position
        );

        Ok(Self { config })
    }

    /// Loads configuration from defaults, an optional file and the environment
    pub fn from_path(path: Option<&Path>) -> Result<Self> {
        Self::new(runtime_config::load(path)?)
    }

    /// Gets the runtime configuration
    pub fn get_config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Gets the engine section of the configuration
    pub fn get_engine_config(&self) -> &EngineConfig {
        &self.config.engine
    }

    /// Creates a variable holding `values`
    ///
    /// Fixed-point representations use the configured default position.
    pub fn variable(
        &self,
        representation: DataRepresentation,
        shape: Shape,
        values: &[f32],
    ) -> Result<VariableRef> {
        let position = if representation.is_fixed_point() {
            self.config.engine.default_fixed_point_position
        } else {
            0
        };
        let variable = Variable::from_values(representation, shape, position, values)?;
        Ok(VariableRef::new(variable))
    }

    /// Allocates any unallocated functions, then executes all of them in order
    pub fn run(&self, functions: &mut [Function]) -> Result<()> {
        for function in functions.iter_mut() {
            if function.state() == FunctionState::Unallocated {
                function.allocate(&self.config.engine)?;
            }
        }
        for function in functions.iter() {
            function.execute()?;
        }
        debug!("Executed {} functions", functions.len());
        Ok(())
    }

    /// Releases every function
    pub fn release(&self, functions: &mut [Function]) -> Result<()> {
        for function in functions.iter_mut() {
            function.release()?;
        }
        Ok(())
    }

    /// Total storage held by `variables`, in bytes
    pub fn footprint(variables: &[VariableRef]) -> u64 {
        variables
            .iter()
            .map(|variable| variable.read().byte_len() as u64)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inference_engine::kernels::affine::AffineConfig;
    use inference_engine::FunctionConfig;
    use runtime_config::DispatchPolicy;
    use std::io::Write;

    fn shape(dims: &[usize]) -> Shape {
        Shape::new(dims.to_vec()).unwrap()
    }

    #[test]
    fn test_runtime_runs_affine() {
        let runtime = Runtime::new(RuntimeConfig::default()).unwrap();
        let x = runtime
            .variable(DataRepresentation::Float32, shape(&[1, 2]), &[1.0, 2.0])
            .unwrap();
        let w = runtime
            .variable(
                DataRepresentation::Int8,
                shape(&[2, 3]),
                &[0.5, 0.0, 0.5, 0.0, 0.5, 0.5],
            )
            .unwrap();
        let y = runtime
            .variable(DataRepresentation::Float32, shape(&[1, 3]), &[0.0; 3])
            .unwrap();

        let mut functions = vec![Function::new(
            FunctionConfig::Affine(AffineConfig::default()),
            vec![x, w.clone()],
            vec![y.clone()],
        )];
        runtime.run(&mut functions).unwrap();
        assert_eq!(y.read().as_f32(), &[0.5, 1.0, 1.5]);
        assert_eq!(w.read().fixed_point_position(), 7);

        runtime.release(&mut functions).unwrap();
        assert_eq!(functions[0].state(), FunctionState::Released);
        assert!(runtime.run(&mut functions).unwrap_err().is_lifecycle());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = RuntimeConfig::default();
        config.engine.default_fixed_point_position = 20;
        assert!(Runtime::new(config).is_err());
    }

    #[test]
    fn test_footprint() {
        let mut config = RuntimeConfig::default();
        config.engine.dispatch = DispatchPolicy::GenericOnly;
        let runtime = Runtime::new(config).unwrap();
        let variables = vec![
            runtime
                .variable(DataRepresentation::Float32, shape(&[4]), &[0.0; 4])
                .unwrap(),
            runtime
                .variable(DataRepresentation::Sign, shape(&[9]), &[1.0; 9])
                .unwrap(),
        ];
        assert_eq!(Runtime::footprint(&variables), 18);
        assert_eq!(runtime.get_engine_config().dispatch, DispatchPolicy::GenericOnly);
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[engine]").unwrap();
        writeln!(file, "dispatch = \"generic-only\"").unwrap();
        writeln!(file, "default_fixed_point_position = 4").unwrap();

        let runtime = Runtime::from_path(Some(file.path())).unwrap();
        assert_eq!(runtime.get_engine_config().dispatch, DispatchPolicy::GenericOnly);

        let v = runtime
            .variable(DataRepresentation::Int16, shape(&[1]), &[0.25])
            .unwrap();
        assert_eq!(v.read().fixed_point_position(), 4);
    }
}
