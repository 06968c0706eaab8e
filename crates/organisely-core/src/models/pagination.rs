use serde::{Deserialize, Serialize};

/// Page selection for list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub cursor: Option<String>,
}

impl PaginationParams {
    /// Query pairs for the set fields. Zero page/limit values are omitted.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page.filter(|p| *p > 0) {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit.filter(|l| *l > 0) {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(cursor) = self.cursor.as_deref().filter(|c| !c.is_empty()) {
            pairs.push(("cursor", cursor.to_string()));
        }
        pairs
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PageInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_cursor: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_and_zero_values_are_skipped() {
        let params = PaginationParams {
            page: Some(0),
            limit: Some(25),
            cursor: Some(String::new()),
        };
        assert_eq!(params.query_pairs(), vec![("limit", "25".to_string())]);
        assert!(PaginationParams::default().query_pairs().is_empty());
    }

    #[test]
    fn page_info_uses_camel_case() {
        let info: PageInfo = serde_json::from_str(
            r#"{"page":1,"limit":20,"total":41,"totalPages":3,"hasNext":true,"hasPrev":false,"nextCursor":"c2"}"#,
        )
        .unwrap();
        assert_eq!(info.total_pages, 3);
        assert_eq!(info.next_cursor.as_deref(), Some("c2"));
        assert!(info.prev_cursor.is_none());
    }
}
