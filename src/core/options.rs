use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 选项值 - 字符串或基础类型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl OptionValue {
    /// 传给解码引擎时的字符串形式
    pub fn to_engine_string(&self) -> String {
        match self {
            OptionValue::Bool(b) => (if *b { "1" } else { "0" }).to_string(),
            OptionValue::Int(i) => i.to_string(),
            OptionValue::Float(f) => f.to_string(),
            OptionValue::String(s) => s.clone(),
        }
    }

    /// 空字符串值：对已打开的会话无效果，下次加载时清除该键
    pub fn is_empty(&self) -> bool {
        matches!(self, OptionValue::String(s) if s.is_empty())
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::String(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        OptionValue::String(s)
    }
}

impl From<i64> for OptionValue {
    fn from(i: i64) -> Self {
        OptionValue::Int(i)
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

impl From<f64> for OptionValue {
    fn from(f: f64) -> Self {
        OptionValue::Float(f)
    }
}

/// 解码引擎选项字典
///
/// 只在 open 时传给引擎，加载后修改要等下一次加载才生效
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionDict {
    entries: HashMap<String, OptionValue>,
}

impl OptionDict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<OptionValue>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<OptionValue> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &OptionValue)> {
        self.entries.iter()
    }

    /// 展开为引擎可用的字符串字典，空值键被跳过
    pub fn to_engine_dict(&self) -> HashMap<String, String> {
        self.entries
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (k.clone(), v.to_engine_string()))
            .collect()
    }

    /// 清除空值键（每次加载时调用，之后 options() 中不再出现）
    pub fn prune_empty(&mut self) {
        self.entries.retain(|_, v| !v.is_empty());
    }

    /// 从 JSON 对象解析
    pub fn from_json(s: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(&self)?)
    }
}
