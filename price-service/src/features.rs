//! 房屋特征解析与特征工程

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::error::PredictError;

/// 请求中必须提供的 12 个字段（按模型列顺序）
pub const INPUT_COLUMNS: [&str; 12] = [
    "area",
    "bedrooms",
    "bathrooms",
    "stories",
    "mainroad",
    "guestroom",
    "basement",
    "hotwaterheating",
    "airconditioning",
    "parking",
    "prefarea",
    "furnishingstatus",
];

/// 派生列（按模型列顺序，紧跟在输入列之后）
pub const DERIVED_COLUMNS: [&str; 6] = [
    "bedrooms_per_story",
    "bathrooms_per_story",
    "total_rooms",
    "stories_per_area",
    "parking_per_area",
    "stories_area_interaction",
];

/// 模型期望的列数
pub const EXPECTED_COLUMNS: usize = INPUT_COLUMNS.len() + DERIVED_COLUMNS.len();

/// 单套房屋的输入特征
#[derive(Debug, Clone, Deserialize)]
pub struct HousingFeatures {
    pub area: f64,
    pub bedrooms: f64,
    pub bathrooms: f64,
    pub stories: f64,
    pub mainroad: f64,
    pub guestroom: f64,
    pub basement: f64,
    pub hotwaterheating: f64,
    pub airconditioning: f64,
    pub parking: f64,
    pub prefarea: f64,
    pub furnishingstatus: f64,
    /// 未知字段，作为额外列追加在末尾（按键名排序）
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// 一行特征：列名与取值一一对应
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureRow {
    names: Vec<String>,
    values: Vec<f64>,
}

impl FeatureRow {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            names: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, name: impl Into<String>, value: f64) {
        self.names.push(name.into());
        self.values.push(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.values[i])
    }
}

impl HousingFeatures {
    /// 从已确认是 JSON 对象的请求体解析
    pub fn from_payload(payload: serde_json::Value) -> Result<Self, PredictError> {
        serde_json::from_value(payload).map_err(|e| PredictError::Validation(e.to_string()))
    }

    fn inputs(&self) -> [f64; 12] {
        [
            self.area,
            self.bedrooms,
            self.bathrooms,
            self.stories,
            self.mainroad,
            self.guestroom,
            self.basement,
            self.hotwaterheating,
            self.airconditioning,
            self.parking,
            self.prefarea,
            self.furnishingstatus,
        ]
    }

    /// 计算派生列并组装完整的特征行
    ///
    /// 除数为 0 不做保护，产生的 inf/NaN 在此统一拒绝。
    pub fn derive(&self) -> Result<FeatureRow, PredictError> {
        let mut row = FeatureRow::with_capacity(EXPECTED_COLUMNS + self.extra.len());

        for (name, value) in INPUT_COLUMNS.iter().zip(self.inputs()) {
            row.push(*name, value);
        }

        let derived = [
            self.bedrooms / self.stories,
            self.bathrooms / self.stories,
            self.bedrooms + self.bathrooms,
            self.stories / self.area,
            self.parking / self.area,
            self.stories * self.area,
        ];
        for (name, value) in DERIVED_COLUMNS.iter().zip(derived) {
            row.push(*name, value);
        }

        for (name, value) in &self.extra {
            // 与派生列同名的字段会被派生值覆盖
            if DERIVED_COLUMNS.contains(&name.as_str()) {
                continue;
            }
            let value = value.as_f64().ok_or_else(|| {
                PredictError::Validation(format!("Column `{}` is not numeric: {}", name, value))
            })?;
            row.push(name.as_str(), value);
        }

        if let Some((name, value)) = row
            .names()
            .iter()
            .zip(row.values())
            .find(|(_, v)| !v.is_finite())
        {
            return Err(PredictError::Validation(format!(
                "Input contains infinity or NaN: column `{}` = {}",
                name, value
            )));
        }

        Ok(row)
    }
}
