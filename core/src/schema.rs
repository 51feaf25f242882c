//! Declarative catalog of the resources the client knows about.
//!
//! # Design
//! Each resource is described as data: its wire type, collection path,
//! attributes, relationships (with their `limit[...]` ceilings), filterable
//! and sortable keys, and the HTTP methods its collection and instance paths
//! accept. One generic [`Endpoint`](crate::Endpoint) validates every query
//! parameter against these tables instead of one hand-written type per
//! resource. All names are stored in the wire convention (lowerCamelCase).

use crate::http::HttpMethod;

/// Ceiling for the primary `limit` parameter on every collection.
pub const PRIMARY_LIMIT_MAX: u32 = 200;

/// A relationship of a resource and the ceiling of its `limit[name]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationshipSchema {
    pub name: &'static str,
    pub related_type: &'static str,
    /// `None` when the API does not accept `limit[name]` (to-one links).
    pub limit_max: Option<u32>,
}

/// A filterable key. `values` enumerates the accepted values when the API
/// restricts them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSchema {
    pub name: &'static str,
    pub values: Option<&'static [&'static str]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceSchema {
    pub resource_type: &'static str,
    pub path: &'static str,
    pub attributes: &'static [&'static str],
    pub relationships: &'static [RelationshipSchema],
    pub filters: &'static [FilterSchema],
    pub sorts: &'static [&'static str],
    pub exists: &'static [&'static str],
    pub collection_methods: &'static [HttpMethod],
    pub instance_methods: &'static [HttpMethod],
}

impl ResourceSchema {
    pub fn relationship(&self, name: &str) -> Option<&RelationshipSchema> {
        self.relationships.iter().find(|r| r.name == name)
    }

    pub fn filter(&self, name: &str) -> Option<&FilterSchema> {
        self.filters.iter().find(|f| f.name == name)
    }

    pub fn is_sortable(&self, name: &str) -> bool {
        self.sorts.contains(&name)
    }

    pub fn accepts_exists(&self, name: &str) -> bool {
        self.exists.contains(&name)
    }

    /// Relationship names usable with `include`.
    pub fn includes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.relationships.iter().map(|r| r.name)
    }

    /// Names usable in `fields[<this type>]`: attributes, then relationships.
    pub fn fields_of(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.attributes.iter().copied().chain(self.includes())
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields_of().any(|f| f == name)
    }

    pub fn supports(&self, method: &HttpMethod, instance: bool) -> bool {
        let methods = if instance {
            self.instance_methods
        } else {
            self.collection_methods
        };
        methods.contains(method)
    }
}

/// Look up a resource by its wire type (`apps`, `betaTesters`, ...).
pub fn lookup(resource_type: &str) -> Option<&'static ResourceSchema> {
    CATALOG.iter().copied().find(|s| s.resource_type == resource_type)
}

pub fn catalog() -> &'static [&'static ResourceSchema] {
    CATALOG
}

const fn rel(name: &'static str, related_type: &'static str, limit_max: Option<u32>) -> RelationshipSchema {
    RelationshipSchema {
        name,
        related_type,
        limit_max,
    }
}

const fn filter(name: &'static str) -> FilterSchema {
    FilterSchema { name, values: None }
}

const fn enum_filter(name: &'static str, values: &'static [&'static str]) -> FilterSchema {
    FilterSchema {
        name,
        values: Some(values),
    }
}

use HttpMethod::{Delete, Get, Patch, Post};

const PLATFORMS: &[&str] = &["IOS", "MAC_OS", "TV_OS", "VISION_OS"];
const BUNDLE_ID_PLATFORMS: &[&str] = &["IOS", "MAC_OS", "UNIVERSAL"];
const PROCESSING_STATES: &[&str] = &["PROCESSING", "FAILED", "INVALID", "VALID"];
const INVITE_TYPES: &[&str] = &["EMAIL", "PUBLIC_LINK"];
const BOOLEANS: &[&str] = &["true", "false"];
const USER_ROLES: &[&str] = &[
    "ADMIN",
    "FINANCE",
    "ACCOUNT_HOLDER",
    "SALES",
    "MARKETING",
    "APP_MANAGER",
    "DEVELOPER",
    "ACCESS_TO_REPORTS",
    "CUSTOMER_SUPPORT",
];

pub static APPS: ResourceSchema = ResourceSchema {
    resource_type: "apps",
    path: "/v1/apps",
    attributes: &[
        "name",
        "bundleId",
        "sku",
        "primaryLocale",
        "isOrEverWasMadeForKids",
        "contentRightsDeclaration",
    ],
    relationships: &[
        rel("betaGroups", "betaGroups", Some(50)),
        rel("builds", "builds", Some(50)),
        rel("preReleaseVersions", "preReleaseVersions", Some(50)),
        rel("betaAppLocalizations", "betaAppLocalizations", Some(40)),
    ],
    filters: &[
        filter("bundleId"),
        filter("id"),
        filter("name"),
        filter("sku"),
        enum_filter("appStoreVersions.platform", PLATFORMS),
    ],
    sorts: &["bundleId", "name", "sku"],
    exists: &["gameCenterEnabledVersions"],
    collection_methods: &[Get],
    instance_methods: &[Get, Patch],
};

pub static BUILDS: ResourceSchema = ResourceSchema {
    resource_type: "builds",
    path: "/v1/builds",
    attributes: &[
        "version",
        "uploadedDate",
        "expirationDate",
        "expired",
        "minOsVersion",
        "processingState",
        "usesNonExemptEncryption",
    ],
    relationships: &[
        rel("app", "apps", None),
        rel("betaGroups", "betaGroups", Some(50)),
        rel("individualTesters", "betaTesters", Some(50)),
        rel("preReleaseVersion", "preReleaseVersions", None),
        rel("buildBetaDetail", "buildBetaDetails", None),
    ],
    filters: &[
        filter("app"),
        enum_filter("expired", BOOLEANS),
        enum_filter("processingState", PROCESSING_STATES),
        filter("version"),
        filter("preReleaseVersion.version"),
        enum_filter("preReleaseVersion.platform", PLATFORMS),
        filter("betaGroups"),
        filter("id"),
    ],
    sorts: &["uploadedDate", "version", "preReleaseVersion"],
    exists: &["usesNonExemptEncryption"],
    collection_methods: &[Get],
    instance_methods: &[Get, Patch],
};

pub static BETA_GROUPS: ResourceSchema = ResourceSchema {
    resource_type: "betaGroups",
    path: "/v1/betaGroups",
    attributes: &[
        "name",
        "createdDate",
        "isInternalGroup",
        "publicLinkEnabled",
        "publicLinkId",
        "publicLinkLimitEnabled",
        "publicLinkLimit",
        "publicLink",
        "feedbackEnabled",
    ],
    relationships: &[
        rel("app", "apps", None),
        rel("builds", "builds", Some(1000)),
        rel("betaTesters", "betaTesters", Some(50)),
    ],
    filters: &[
        filter("app"),
        filter("builds"),
        filter("id"),
        enum_filter("isInternalGroup", BOOLEANS),
        filter("name"),
        enum_filter("publicLinkEnabled", BOOLEANS),
        filter("publicLink"),
    ],
    sorts: &["createdDate", "name", "publicLinkEnabled", "publicLinkLimit"],
    exists: &[],
    collection_methods: &[Get, Post],
    instance_methods: &[Get, Patch, Delete],
};

pub static BETA_TESTERS: ResourceSchema = ResourceSchema {
    resource_type: "betaTesters",
    path: "/v1/betaTesters",
    attributes: &["firstName", "lastName", "email", "inviteType"],
    relationships: &[
        rel("apps", "apps", Some(50)),
        rel("betaGroups", "betaGroups", Some(50)),
        rel("builds", "builds", Some(50)),
    ],
    filters: &[
        filter("apps"),
        filter("betaGroups"),
        filter("builds"),
        filter("email"),
        filter("firstName"),
        filter("lastName"),
        filter("id"),
        enum_filter("inviteType", INVITE_TYPES),
    ],
    sorts: &["email", "firstName", "lastName", "inviteType"],
    exists: &[],
    collection_methods: &[Get, Post],
    instance_methods: &[Get, Delete],
};

pub static BETA_TESTER_INVITATIONS: ResourceSchema = ResourceSchema {
    resource_type: "betaTesterInvitations",
    path: "/v1/betaTesterInvitations",
    attributes: &[],
    relationships: &[
        rel("app", "apps", None),
        rel("betaTester", "betaTesters", None),
    ],
    filters: &[],
    sorts: &[],
    exists: &[],
    collection_methods: &[Post],
    instance_methods: &[],
};

pub static BUNDLE_IDS: ResourceSchema = ResourceSchema {
    resource_type: "bundleIds",
    path: "/v1/bundleIds",
    attributes: &["name", "platform", "identifier", "seedId"],
    relationships: &[
        rel("app", "apps", None),
        rel("bundleIdCapabilities", "bundleIdCapabilities", Some(50)),
        rel("profiles", "profiles", Some(50)),
    ],
    filters: &[
        filter("identifier"),
        filter("name"),
        enum_filter("platform", BUNDLE_ID_PLATFORMS),
        filter("seedId"),
        filter("id"),
    ],
    sorts: &["id", "identifier", "name", "platform", "seedId"],
    exists: &[],
    collection_methods: &[Get, Post],
    instance_methods: &[Get, Patch, Delete],
};

pub static USERS: ResourceSchema = ResourceSchema {
    resource_type: "users",
    path: "/v1/users",
    attributes: &[
        "username",
        "firstName",
        "lastName",
        "roles",
        "allAppsVisible",
        "provisioningAllowed",
    ],
    relationships: &[rel("visibleApps", "apps", Some(50))],
    filters: &[
        enum_filter("roles", USER_ROLES),
        filter("username"),
        filter("visibleApps"),
    ],
    sorts: &["lastName", "username"],
    exists: &[],
    collection_methods: &[Get],
    instance_methods: &[Get, Patch, Delete],
};

pub static PRE_RELEASE_VERSIONS: ResourceSchema = ResourceSchema {
    resource_type: "preReleaseVersions",
    path: "/v1/preReleaseVersions",
    attributes: &["version", "platform"],
    relationships: &[rel("app", "apps", None), rel("builds", "builds", Some(50))],
    filters: &[
        filter("app"),
        filter("builds"),
        enum_filter("platform", PLATFORMS),
        filter("version"),
    ],
    sorts: &["version"],
    exists: &[],
    collection_methods: &[Get],
    instance_methods: &[Get],
};

pub static BUILD_BETA_DETAILS: ResourceSchema = ResourceSchema {
    resource_type: "buildBetaDetails",
    path: "/v1/buildBetaDetails",
    attributes: &["autoNotifyEnabled", "internalBuildState", "externalBuildState"],
    relationships: &[rel("build", "builds", None)],
    filters: &[filter("build"), filter("id")],
    sorts: &[],
    exists: &[],
    collection_methods: &[Get],
    instance_methods: &[Get, Patch],
};

pub static BETA_APP_LOCALIZATIONS: ResourceSchema = ResourceSchema {
    resource_type: "betaAppLocalizations",
    path: "/v1/betaAppLocalizations",
    attributes: &[
        "feedbackEmail",
        "marketingUrl",
        "privacyPolicyUrl",
        "description",
        "locale",
    ],
    relationships: &[rel("app", "apps", None)],
    filters: &[filter("app"), filter("locale")],
    sorts: &[],
    exists: &[],
    collection_methods: &[Get, Post],
    instance_methods: &[Get, Patch, Delete],
};

pub static BUNDLE_ID_CAPABILITIES: ResourceSchema = ResourceSchema {
    resource_type: "bundleIdCapabilities",
    path: "/v1/bundleIdCapabilities",
    attributes: &["capabilityType", "settings"],
    relationships: &[],
    filters: &[],
    sorts: &[],
    exists: &[],
    collection_methods: &[Post],
    instance_methods: &[Patch, Delete],
};

pub static PROFILES: ResourceSchema = ResourceSchema {
    resource_type: "profiles",
    path: "/v1/profiles",
    attributes: &[
        "name",
        "platform",
        "profileType",
        "profileState",
        "profileContent",
        "uuid",
        "createdDate",
        "expirationDate",
    ],
    relationships: &[rel("bundleId", "bundleIds", None)],
    filters: &[filter("name"), filter("id")],
    sorts: &["id", "name", "profileState", "profileType"],
    exists: &[],
    collection_methods: &[Get, Post],
    instance_methods: &[Get, Delete],
};

static CATALOG: &[&ResourceSchema] = &[
    &APPS,
    &BUILDS,
    &BETA_GROUPS,
    &BETA_TESTERS,
    &BETA_TESTER_INVITATIONS,
    &BUNDLE_IDS,
    &USERS,
    &PRE_RELEASE_VERSIONS,
    &BUILD_BETA_DETAILS,
    &BETA_APP_LOCALIZATIONS,
    &BUNDLE_ID_CAPABILITIES,
    &PROFILES,
];
