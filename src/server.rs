//! MCP server exposing one search index.

use crate::engine::SearchIndex;
use crate::schema::inline_schema_for_type;
use crate::tools::list_sections::{ListSectionsRequest, handle_list_sections};
use crate::tools::search::{SearchDefaults, SearchRequest, handle_search};
use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    tool, tool_handler, tool_router,
};
use std::sync::Arc;

/// MCP Server for Doxygen search index queries
#[derive(Clone)]
pub struct IndexServer {
    /// The index every tool call reads; its shard cache lives as long as the server
    index: Arc<SearchIndex>,

    defaults: Arc<SearchDefaults>,

    /// Tool router for handling MCP tool calls
    tool_router: ToolRouter<Self>,
}

impl std::fmt::Debug for IndexServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexServer")
            .field("index", &self.index)
            .field("defaults", &self.defaults)
            .finish()
    }
}

#[tool_router]
impl IndexServer {
    pub fn new(index: Arc<SearchIndex>, defaults: SearchDefaults) -> Self {
        Self {
            index,
            defaults: Arc::new(defaults),
            tool_router: Self::tool_router(),
        }
    }

    pub const fn index(&self) -> &Arc<SearchIndex> {
        &self.index
    }

    #[tool(
        description = "Search the documentation index for classes, functions, files, namespaces and pages. Matches keys by substring, ranks prefix matches first and shorter keys before longer ones, and lists every location a symbol is documented at.",
        input_schema = inline_schema_for_type::<SearchRequest>()
    )]
    async fn search(
        &self,
        Parameters(request): Parameters<SearchRequest>,
    ) -> std::result::Result<String, String> {
        handle_search(&self.index, request, &self.defaults).await
    }

    #[tool(
        description = "List the sections of the documentation index (e.g. all, classes, functions) with their labels and number of shards.",
        input_schema = inline_schema_for_type::<ListSectionsRequest>()
    )]
    async fn list_sections(
        &self,
        Parameters(_request): Parameters<ListSectionsRequest>,
    ) -> std::result::Result<String, String> {
        let defaults = self.defaults.resolve_sections(&self.index);
        Ok(handle_list_sections(self.index.manifest(), &defaults))
    }
}

#[tool_handler]
impl ServerHandler for IndexServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_protocol_version(ProtocolVersion::V_2024_11_05)
            .with_server_info(Implementation::from_build_env())
            .with_instructions(
                "doxysearch: searches the static index of Doxygen-generated HTML documentation. \
                 Use list_sections to see what can be searched, then search with a symbol, \
                 file or page name. Result links are relative to the index directory."
                    .to_string(),
            )
    }
}
