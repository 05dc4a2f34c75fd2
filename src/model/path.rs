//! 路径编解码：结构化路径（键 / 下标序列）与规范点分字符串之间的互转
//!
//! 输入接受方括号下标 `a[0].b`，统一规范化为 `a.0.b`；方括号形式不会被保留。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// 将 `[n]` 改写为 `.n`；开头的 `[n]` 不产生前导点
pub fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(open) = rest.find('[') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let digits = after.bytes().take_while(u8::is_ascii_digit).count();
        if digits > 0 && after[digits..].starts_with(']') {
            if !out.is_empty() {
                out.push('.');
            }
            out.push_str(&after[..digits]);
            rest = &after[digits + 1..];
        } else {
            out.push('[');
            rest = after;
        }
    }
    out.push_str(rest);
    out
}

/// 按 `.` 切分规范路径；空字符串返回空列表（即根）
pub fn split(canonical: &str) -> Vec<String> {
    if canonical.is_empty() {
        return Vec::new();
    }
    canonical.split('.').map(str::to_string).collect()
}

/// 判断一个路径段是否是数组下标（十进制、非负、无前导零）
pub fn parse_index(step: &str) -> Option<usize> {
    let bytes = step.as_bytes();
    if bytes.is_empty() || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    if bytes.len() > 1 && bytes[0] == b'0' {
        return None;
    }
    step.parse().ok()
}

/// 规范化后的结构路径
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path {
    steps: Vec<String>,
}

impl Path {
    pub fn root() -> Self {
        Self::default()
    }

    /// 解析任意输入（允许方括号下标）
    pub fn parse(raw: &str) -> Self {
        Self {
            steps: split(&normalize(raw)),
        }
    }

    pub fn from_steps<I, S>(steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            steps: steps.into_iter().map(Into::into).collect(),
        }
    }

    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    pub fn is_root(&self) -> bool {
        self.steps.is_empty()
    }

    /// 追加对象键，返回新路径
    pub fn child_key(&self, key: &str) -> Self {
        let mut steps = self.steps.clone();
        steps.push(key.to_string());
        Self { steps }
    }

    /// 追加数组下标，返回新路径
    pub fn child_index(&self, index: usize) -> Self {
        let mut steps = self.steps.clone();
        steps.push(index.to_string());
        Self { steps }
    }

    /// 按段比较的前缀关系（相等也算前缀）
    pub fn starts_with(&self, prefix: &Path) -> bool {
        self.steps.starts_with(&prefix.steps)
    }

    /// 规范字符串形式
    pub fn to_canonical(&self) -> String {
        self.steps.join(".")
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_canonical())
    }
}

impl FromStr for Path {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Path::parse(s))
    }
}

impl From<&str> for Path {
    fn from(raw: &str) -> Self {
        Path::parse(raw)
    }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_canonical())
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Path::parse(&raw))
    }
}
