// In crates/signals/src/types.rs

use crate::{IndicatorError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct IndicatorSettings {
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,
    #[serde(default = "default_sma_period")]
    pub sma_period: usize,
    #[serde(default = "default_macd_fast")]
    pub macd_fast: usize,
    #[serde(default = "default_macd_slow")]
    pub macd_slow: usize,
    #[serde(default = "default_macd_signal")]
    pub macd_signal: usize,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            rsi_period: default_rsi_period(),
            sma_period: default_sma_period(),
            macd_fast: default_macd_fast(),
            macd_slow: default_macd_slow(),
            macd_signal: default_macd_signal(),
        }
    }
}

impl IndicatorSettings {
    /// Rejects settings that would fail on every series they are applied to.
    pub fn validate(&self) -> Result<()> {
        let periods = [
            ("rsi", self.rsi_period),
            ("sma", self.sma_period),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
        ];
        if let Some((name, _)) = periods.into_iter().find(|(_, period)| *period == 0) {
            return Err(IndicatorError::InvalidPeriod { name });
        }
        if self.macd_fast >= self.macd_slow {
            return Err(IndicatorError::InvalidMacdPeriods {
                fast: self.macd_fast,
                slow: self.macd_slow,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ClassifierSettings {
    /// Number of bars before the latest one that form the breakout channel.
    #[serde(default = "default_channel_length")]
    pub channel_length: usize,
    #[serde(default = "default_rsi_oversold")]
    pub rsi_oversold: f64,
    #[serde(default = "default_rsi_overbought")]
    pub rsi_overbought: f64,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            channel_length: default_channel_length(),
            rsi_oversold: default_rsi_oversold(),
            rsi_overbought: default_rsi_overbought(),
        }
    }
}

impl ClassifierSettings {
    pub fn validate(&self) -> Result<()> {
        if self.channel_length == 0 {
            return Err(IndicatorError::InvalidPeriod { name: "channel_length" });
        }
        let in_range = |level: f64| (0.0..=100.0).contains(&level);
        if !(in_range(self.rsi_oversold)
            && in_range(self.rsi_overbought)
            && self.rsi_oversold < self.rsi_overbought)
        {
            return Err(IndicatorError::InvalidRsiThresholds {
                oversold: self.rsi_oversold,
                overbought: self.rsi_overbought,
            });
        }
        Ok(())
    }
}

fn default_rsi_period() -> usize { 14 }
fn default_sma_period() -> usize { 20 }
fn default_macd_fast() -> usize { 12 }
fn default_macd_slow() -> usize { 26 }
fn default_macd_signal() -> usize { 9 }
fn default_channel_length() -> usize { 20 }
fn default_rsi_oversold() -> f64 { 30.0 }
fn default_rsi_overbought() -> f64 { 70.0 }
