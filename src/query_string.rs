use std::collections::HashMap;

#[derive(PartialEq, Debug)]
pub struct QueryString {
    items: HashMap<String, String>,
}

impl QueryString {
    pub fn from(buf: &str) -> Self {
        let vs: Vec<(String, String)> = serde_urlencoded::from_str(buf).unwrap_or_else(|_| vec![]);
        let items: HashMap<String, String> = vs.into_iter().collect();

        QueryString {
            items,
        }
    }

    pub fn from_optional(buf: Option<&str>) -> Self {
        Self::from(buf.unwrap_or(""))
    }

    /// `page` parameter, 1 when absent, invalid or below 1.
    pub fn get_page(&self) -> i64 {
        match self.items.get("page").and_then(|val| val.parse::<i64>().ok()) {
            Some(page) if page >= 1 => page,
            _ => 1,
        }
    }

    /// Positive integer parameter, 0 when absent or invalid.
    pub fn get_dimension(&self, key: &str) -> u32 {
        self.items.get(key)
            .and_then(|val| val.parse::<u32>().ok())
            .unwrap_or(0)
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.items.get(key).is_some_and(|val| val == "true")
    }
}
