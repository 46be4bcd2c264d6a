use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Result renderings the UI may offer for an executor's output.
///
/// Keep this list in sync with the views the frontend defines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultView {
    VisualDelta,
    AnnotatedDelta,
    Json,
    Logs,
}

const ALL_RESULT_VIEWS: [ResultView; 4] = [
    ResultView::VisualDelta,
    ResultView::AnnotatedDelta,
    ResultView::Json,
    ResultView::Logs,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    Processor,
}

/// Information about a playground executor: identity, component
/// version, documentation link, and which result views apply.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    pub id: String,
    pub name: String,
    pub path: String,
    pub version: String,
    #[serde(rename = "docsURL")]
    pub docs_url: String,
    pub result_view_config: BTreeMap<ResultView, bool>,
    pub debuggable: bool,
}

impl Metadata {
    /// A processor executor with every result view enabled.
    pub fn processor(
        id: impl Into<String>,
        name: impl Into<String>,
        path: impl Into<String>,
        version: impl Into<String>,
        docs_url: impl Into<String>,
    ) -> Self {
        Self {
            component_type: ComponentType::Processor,
            id: id.into(),
            name: name.into(),
            path: path.into(),
            version: version.into(),
            docs_url: docs_url.into(),
            result_view_config: ALL_RESULT_VIEWS.iter().map(|v| (*v, true)).collect(),
            debuggable: false,
        }
    }

    /// Enables only the given result views.
    pub fn with_result_views(mut self, views: &[ResultView]) -> Self {
        for enabled in self.result_view_config.values_mut() {
            *enabled = false;
        }
        for view in views {
            self.result_view_config.insert(*view, true);
        }
        self
    }

    /// Disables the given result views.
    pub fn without_result_views(mut self, views: &[ResultView]) -> Self {
        for view in views {
            self.result_view_config.insert(*view, false);
        }
        self
    }

    pub fn result_view_enabled(&self, view: ResultView) -> bool {
        self.result_view_config.get(&view).copied().unwrap_or(false)
    }
}
