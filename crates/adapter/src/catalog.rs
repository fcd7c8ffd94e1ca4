//! The fixed MMS operation catalog.
//!
//! Every MCP tool the adapter exposes is one row of [`OPERATIONS`]: a verb, a path template and
//! a typed parameter list. Rows are tagged with a [`Capability`] so the registry can drop the
//! mutating half of the catalog in read-only mode without any branching here.

use reqwest::Method;

/// Whether an operation mutates backend state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Read,
    Write,
}

/// Semantic type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Opaque identifier substituted into the path template.
    Identifier,
    /// RDF content in Turtle format, sent as the request body.
    Turtle,
    /// SPARQL 1.1 query, sent as the request body.
    SparqlQuery,
    /// SPARQL 1.1 update, sent as the request body.
    SparqlUpdate,
}

impl ParamKind {
    /// Content type of the outgoing body, `None` for path parameters.
    #[must_use]
    pub fn content_type(self) -> Option<&'static str> {
        match self {
            Self::Identifier => None,
            Self::Turtle => Some("text/turtle"),
            Self::SparqlQuery => Some("application/sparql-query"),
            Self::SparqlUpdate => Some("application/sparql-update"),
        }
    }

    #[must_use]
    pub fn is_body(self) -> bool {
        self.content_type().is_some()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub description: &'static str,
}

#[derive(Debug, Clone)]
pub struct OperationSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub capability: Capability,
    pub method: Method,
    /// Path relative to the MMS base URL; `{name}` placeholders bind identifier parameters.
    pub path: &'static str,
    pub params: &'static [ParamSpec],
}

impl OperationSpec {
    /// The parameter carried as the request body, if any.
    #[must_use]
    pub fn body_param(&self) -> Option<&'static ParamSpec> {
        self.params.iter().find(|p| p.kind.is_body())
    }

    #[cfg(test)]
    pub fn path_params(&self) -> impl Iterator<Item = &'static ParamSpec> {
        self.params.iter().filter(|p| !p.kind.is_body())
    }
}

const ORG: ParamSpec = ParamSpec {
    name: "org_id",
    kind: ParamKind::Identifier,
    description: "The organization ID",
};
const REPO: ParamSpec = ParamSpec {
    name: "repo_id",
    kind: ParamKind::Identifier,
    description: "The repository ID",
};
const BRANCH: ParamSpec = ParamSpec {
    name: "branch_id",
    kind: ParamKind::Identifier,
    description: "The branch ID",
};
const LOCK: ParamSpec = ParamSpec {
    name: "lock_id",
    kind: ParamKind::Identifier,
    description: "The lock ID",
};
const SCRATCH: ParamSpec = ParamSpec {
    name: "scratch_id",
    kind: ParamKind::Identifier,
    description: "The scratch ID",
};
const COLLECTION: ParamSpec = ParamSpec {
    name: "collection_id",
    kind: ParamKind::Identifier,
    description: "The collection ID",
};
const POLICY: ParamSpec = ParamSpec {
    name: "policy_id",
    kind: ParamKind::Identifier,
    description: "The policy ID",
};
const GROUP: ParamSpec = ParamSpec {
    name: "group_id",
    kind: ParamKind::Identifier,
    description: "The group ID",
};
const TURTLE_BODY: ParamSpec = ParamSpec {
    name: "body",
    kind: ParamKind::Turtle,
    description: "RDF content in Turtle format",
};
const RDF_CONTENT: ParamSpec = ParamSpec {
    name: "rdf_content",
    kind: ParamKind::Turtle,
    description: "RDF content to load in turtle format",
};
const SPARQL_QUERY: ParamSpec = ParamSpec {
    name: "sparql_query",
    kind: ParamKind::SparqlQuery,
    description: "SPARQL 1.1 query string",
};
const SPARQL_UPDATE: ParamSpec = ParamSpec {
    name: "sparql_update",
    kind: ParamKind::SparqlUpdate,
    description: "SPARQL 1.1 update string",
};

const fn read(
    name: &'static str,
    description: &'static str,
    method: Method,
    path: &'static str,
    params: &'static [ParamSpec],
) -> OperationSpec {
    OperationSpec {
        name,
        description,
        capability: Capability::Read,
        method,
        path,
        params,
    }
}

const fn write(
    name: &'static str,
    description: &'static str,
    method: Method,
    path: &'static str,
    params: &'static [ParamSpec],
) -> OperationSpec {
    OperationSpec {
        name,
        description,
        capability: Capability::Write,
        method,
        path,
        params,
    }
}

pub static OPERATIONS: &[OperationSpec] = &[
    read("read_all_orgs", "Read all organizations.", Method::GET, "/orgs", &[]),
    read(
        "read_org",
        "Read a specific organization.",
        Method::GET,
        "/orgs/{org_id}",
        &[ORG],
    ),
    read(
        "read_all_repos",
        "Read all repositories in an organization.",
        Method::GET,
        "/orgs/{org_id}/repos",
        &[ORG],
    ),
    read(
        "read_repo",
        "Read a specific repository.",
        Method::GET,
        "/orgs/{org_id}/repos/{repo_id}",
        &[ORG, REPO],
    ),
    read(
        "read_all_branches",
        "Read all branches in a repository.",
        Method::GET,
        "/orgs/{org_id}/repos/{repo_id}/branches",
        &[ORG, REPO],
    ),
    read(
        "read_branch",
        "Read a specific branch.",
        Method::GET,
        "/orgs/{org_id}/repos/{repo_id}/branches/{branch_id}",
        &[ORG, REPO, BRANCH],
    ),
    read(
        "read_model",
        "Read the model at the HEAD of a branch.",
        Method::GET,
        "/orgs/{org_id}/repos/{repo_id}/branches/{branch_id}/graph",
        &[ORG, REPO, BRANCH],
    ),
    read(
        "query_model",
        "Query the model at the HEAD of a branch.",
        Method::POST,
        "/orgs/{org_id}/repos/{repo_id}/branches/{branch_id}/query",
        &[ORG, REPO, BRANCH, SPARQL_QUERY],
    ),
    read(
        "read_all_locks",
        "Read all locks in a repository.",
        Method::GET,
        "/orgs/{org_id}/repos/{repo_id}/locks",
        &[ORG, REPO],
    ),
    read(
        "read_lock",
        "Read a specific lock.",
        Method::GET,
        "/orgs/{org_id}/repos/{repo_id}/locks/{lock_id}",
        &[ORG, REPO, LOCK],
    ),
    read(
        "query_lock",
        "Query the model under the commit pointed to by the given lock.",
        Method::POST,
        "/orgs/{org_id}/repos/{repo_id}/locks/{lock_id}/query",
        &[ORG, REPO, LOCK, SPARQL_QUERY],
    ),
    read(
        "query_diff",
        "Query the given diff.",
        Method::POST,
        "/orgs/{org_id}/repos/{repo_id}/diff/query",
        &[ORG, REPO, SPARQL_QUERY],
    ),
    read(
        "query_repo",
        "Query the metadata graph for the given repository.",
        Method::POST,
        "/orgs/{org_id}/repos/{repo_id}/query",
        &[ORG, REPO, SPARQL_QUERY],
    ),
    read(
        "read_all_scratches",
        "Read all scratches in a repository.",
        Method::GET,
        "/orgs/{org_id}/repos/{repo_id}/scratches",
        &[ORG, REPO],
    ),
    read(
        "read_scratch",
        "Read a specific scratch.",
        Method::GET,
        "/orgs/{org_id}/repos/{repo_id}/scratches/{scratch_id}",
        &[ORG, REPO, SCRATCH],
    ),
    read(
        "query_scratch",
        "Query the model under the given scratch.",
        Method::POST,
        "/orgs/{org_id}/repos/{repo_id}/scratches/{scratch_id}/query",
        &[ORG, REPO, SCRATCH, SPARQL_QUERY],
    ),
    read(
        "read_scratch_model",
        "Read the model at the scratch.",
        Method::GET,
        "/orgs/{org_id}/repos/{repo_id}/scratches/{scratch_id}/graph",
        &[ORG, REPO, SCRATCH],
    ),
    write(
        "create_org",
        "Create an organization.",
        Method::PUT,
        "/orgs/{org_id}",
        &[ORG, TURTLE_BODY],
    ),
    write(
        "update_org",
        "Update an organization.",
        Method::PATCH,
        "/orgs/{org_id}",
        &[ORG, TURTLE_BODY],
    ),
    write(
        "create_repo",
        "Create a repository.",
        Method::PUT,
        "/orgs/{org_id}/repos/{repo_id}",
        &[ORG, REPO, TURTLE_BODY],
    ),
    write(
        "update_repo",
        "Update a repository.",
        Method::PATCH,
        "/orgs/{org_id}/repos/{repo_id}",
        &[ORG, REPO, TURTLE_BODY],
    ),
    write(
        "create_branch",
        "Create a branch.",
        Method::PUT,
        "/orgs/{org_id}/repos/{repo_id}/branches/{branch_id}",
        &[ORG, REPO, BRANCH, TURTLE_BODY],
    ),
    write(
        "update_branch",
        "Update a branch.",
        Method::PATCH,
        "/orgs/{org_id}/repos/{repo_id}/branches/{branch_id}",
        &[ORG, REPO, BRANCH, TURTLE_BODY],
    ),
    write(
        "load_model",
        "Replace the model at the HEAD of a branch by uploading an RDF file.",
        Method::PUT,
        "/orgs/{org_id}/repos/{repo_id}/branches/{branch_id}/graph",
        &[ORG, REPO, BRANCH, RDF_CONTENT],
    ),
    write(
        "commit_model",
        "Commit a change to the model by applying a SPARQL UPDATE.",
        Method::POST,
        "/orgs/{org_id}/repos/{repo_id}/branches/{branch_id}/update",
        &[ORG, REPO, BRANCH, SPARQL_UPDATE],
    ),
    write(
        "create_lock",
        "Create a lock.",
        Method::PUT,
        "/orgs/{org_id}/repos/{repo_id}/locks/{lock_id}",
        &[ORG, REPO, LOCK, SPARQL_UPDATE],
    ),
    write(
        "create_diff",
        "Create a diff between two commits.",
        Method::POST,
        "/orgs/{org_id}/repos/{repo_id}/diff",
        &[ORG, REPO, SPARQL_QUERY],
    ),
    write(
        "create_collection",
        "Create a collection.",
        Method::PUT,
        "/orgs/{org_id}/collections/{collection_id}",
        &[ORG, COLLECTION, TURTLE_BODY],
    ),
    write(
        "create_policy",
        "Create a policy.",
        Method::PUT,
        "/policies/{policy_id}",
        &[POLICY, TURTLE_BODY],
    ),
    write(
        "create_group",
        "Create a group.",
        Method::PUT,
        "/groups/{group_id}",
        &[GROUP, TURTLE_BODY],
    ),
];
