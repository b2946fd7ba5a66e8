//! Fixture configuration types shared by integration tests.

use hyperconf_args::{Arg, BoolArg, FloatArg, IntArg, OptionArg, StrArg};
use hyperconf_schema::{fields, ConfResult, Configurable, ReactionError, SchemaBuilder};
use serde_json::Value;

/// Environment variable bound to [`ExperimentConfig::seed`].
pub const SEED_ENV: &str = "HYPERCONF_TEST_SEED";

/// Training loop settings: `epochs` in `1..=100`, `rate` in `0.0..=1.0`.
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Number of epochs, default 10.
    pub epochs: IntArg,
    /// Learning rate, default 0.01.
    pub rate: FloatArg,
}

impl Configurable for TrainConfig {
    fn defaults() -> ConfResult<Self> {
        Ok(Self {
            epochs: IntArg::builder(10).range(1, 100).build()?,
            rate: FloatArg::builder(0.01).range(0.0, 1.0).build()?,
        })
    }

    fn declare(schema: &mut SchemaBuilder<Self>) -> ConfResult<()> {
        fields!(schema, epochs, rate);
        Ok(())
    }
}

/// Optimizer settings.
///
/// `kind` is applied before `momentum`. Switching `kind` resets `momentum`:
/// `sgd` restores 0.9 and `adam` clears it.
#[derive(Debug, Clone)]
pub struct OptimizerConfig {
    /// `sgd` or `adam`.
    pub kind: OptionArg,
    /// Momentum, absent for `adam`.
    pub momentum: FloatArg,
    /// Whether to apply Nesterov momentum.
    pub nesterov: BoolArg,
    /// How many times `kind` was assigned on this instance.
    pub kind_changes: usize,
}

impl OptimizerConfig {
    fn reset_momentum(&mut self) -> Result<(), ReactionError> {
        self.kind_changes += 1;
        let momentum = match self.kind.as_str() {
            Some("sgd") => Value::from(0.9),
            _ => Value::Null,
        };
        self.momentum.parse(&momentum)?;
        Ok(())
    }
}

impl Configurable for OptimizerConfig {
    fn defaults() -> ConfResult<Self> {
        Ok(Self {
            kind: OptionArg::builder("sgd", ["sgd", "adam"]).build()?,
            momentum: FloatArg::builder(0.9).range(0.0, 1.0).allow_none().build()?,
            nesterov: BoolArg::new(false)?,
            kind_changes: 0,
        })
    }

    fn declare(schema: &mut SchemaBuilder<Self>) -> ConfResult<()> {
        fields!(schema, kind, momentum, nesterov);
        schema.add_dependency("kind", "momentum")?;
        schema.monitor(["kind"], "reset_momentum", Self::reset_momentum);
        Ok(())
    }
}

/// One dense layer.
#[derive(Debug, Clone)]
pub struct LayerConfig {
    /// Width, `1..=4096`.
    pub units: IntArg,
    /// `relu`, `tanh` or `gelu`.
    pub activation: OptionArg,
}

impl LayerConfig {
    /// A layer of `units` with the default activation.
    pub fn with_units(units: i64) -> ConfResult<Self> {
        Ok(Self {
            units: IntArg::builder(units).range(1, 4096).build()?,
            ..Self::defaults()?
        })
    }
}

impl Configurable for LayerConfig {
    fn defaults() -> ConfResult<Self> {
        Ok(Self {
            units: IntArg::builder(16).range(1, 4096).build()?,
            activation: OptionArg::builder("relu", ["relu", "tanh", "gelu"]).build()?,
        })
    }

    fn declare(schema: &mut SchemaBuilder<Self>) -> ConfResult<()> {
        fields!(schema, units, activation);
        Ok(())
    }
}

/// A fixed stack of three layers.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Model name.
    pub name: StrArg,
    /// Layers, widest first.
    pub layers: Vec<LayerConfig>,
    /// Dropout probability, absent by default.
    pub dropout: FloatArg,
}

impl Configurable for ModelConfig {
    fn defaults() -> ConfResult<Self> {
        Ok(Self {
            name: StrArg::new("mlp")?,
            layers: vec![
                LayerConfig::with_units(256)?,
                LayerConfig::with_units(64)?,
                LayerConfig::with_units(10)?,
            ],
            dropout: FloatArg::absent().range(0.0, 1.0).build()?,
        })
    }

    fn declare(schema: &mut SchemaBuilder<Self>) -> ConfResult<()> {
        fields!(schema, name, layers, dropout);
        Ok(())
    }
}

/// A complete experiment nesting the other fixtures.
///
/// `seed` is bound to [`SEED_ENV`].
#[derive(Debug, Clone)]
pub struct ExperimentConfig {
    /// Random seed.
    pub seed: IntArg,
    /// Training loop.
    pub train: TrainConfig,
    /// Optimizer.
    pub optimizer: OptimizerConfig,
    /// Model.
    pub model: ModelConfig,
}

impl Configurable for ExperimentConfig {
    fn defaults() -> ConfResult<Self> {
        Ok(Self {
            seed: IntArg::builder(7).min(0).env_bind(SEED_ENV).build()?,
            train: TrainConfig::defaults()?,
            optimizer: OptimizerConfig::defaults()?,
            model: ModelConfig::defaults()?,
        })
    }

    fn declare(schema: &mut SchemaBuilder<Self>) -> ConfResult<()> {
        fields!(schema, seed, train, optimizer, model);
        schema.add_dependency("model", "optimizer")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyperconf_schema::{descriptor, Conf};
    use serde_json::json;

    #[test]
    fn test_fixtures_register() {
        assert!(descriptor::<TrainConfig>().is_ok());
        assert!(descriptor::<OptimizerConfig>().is_ok());
        assert!(descriptor::<ModelConfig>().is_ok());
        assert!(descriptor::<ExperimentConfig>().is_ok());
    }

    #[test]
    fn test_kind_resets_momentum() {
        let mut opt = Conf::<OptimizerConfig>::new().unwrap();
        opt.set("kind", "adam").unwrap();
        assert!(opt.momentum.is_absent());
        assert_eq!(opt.kind_changes, 1);

        opt.set("kind", "sgd").unwrap();
        assert_eq!(opt.momentum.value(), Some(0.9));
    }

    #[test]
    fn test_explicit_momentum_follows_kind() {
        let input = json!({"momentum": 0.5, "kind": "sgd"});
        let opt = Conf::<OptimizerConfig>::from_plain(
            input.as_object().unwrap().clone(),
            Default::default(),
        )
        .unwrap();
        assert_eq!(opt.momentum.value(), Some(0.5));
    }
}
