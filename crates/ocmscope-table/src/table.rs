use ocmscope_types::{ResourceRow, ResourceType, TopologyNode};

use crate::pagination::Pagination;
use crate::rows::build_rows;
use crate::store::{KeyValueStore, StoreError, page_size_key, restore_page_size};

/// Sortable table column
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Column {
    Name,
    Namespace,
    Cluster,
}

impl Column {
    pub const ALL: [Column; 3] = [Column::Name, Column::Namespace, Column::Cluster];

    pub fn title(&self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Namespace => "Namespace",
            Self::Cluster => "Cluster",
        }
    }

    /// Share of the table width, in percent
    pub fn width_percent(&self) -> u16 {
        match self {
            Self::Name => 40,
            Self::Namespace => 30,
            Self::Cluster => 30,
        }
    }

    pub fn value<'a>(&self, row: &'a ResourceRow) -> &'a str {
        match self {
            Self::Name => &row.name,
            Self::Namespace => row.namespace_or_empty(),
            Self::Cluster => &row.cluster,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            Self::Asc => "▲",
            Self::Desc => "▼",
        }
    }
}

/// A user-requested column sort
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SortBy {
    pub column: Column,
    pub direction: SortDirection,
}

/// Keep rows whose name, namespace or cluster contains `search`, ignoring case
pub fn filter_rows(rows: &[ResourceRow], search: &str) -> Vec<ResourceRow> {
    if search.is_empty() {
        return rows.to_vec();
    }
    let needle = search.to_lowercase();
    rows.iter()
        .filter(|row| {
            Column::ALL
                .iter()
                .any(|column| column.value(row).to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

/// Stable sort by a single column
pub fn sort_rows(rows: &mut [ResourceRow], sort: SortBy) {
    rows.sort_by(|a, b| {
        let ord = sort.column.value(a).cmp(sort.column.value(b));
        match sort.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
}

/// Filterable, sortable, paginated view over the resources of one node
pub struct DetailsTable<S: KeyValueStore> {
    id: String,
    store: S,
    detail_type: ResourceType,
    /// All rows in default order
    available: Vec<ResourceRow>,
    /// Filtered and sorted rows, before pagination
    rows: Vec<ResourceRow>,
    search: String,
    sort_by: Option<SortBy>,
    pagination: Pagination,
}

impl<S: KeyValueStore> DetailsTable<S> {
    /// Build the table for `node`, restoring the persisted page size of `id`
    pub fn new(id: impl Into<String>, node: &TopologyNode, store: S, default_page_size: usize) -> Self {
        let id = id.into();
        let per_page = restore_page_size(&store, &id, default_page_size);
        let available = build_rows(node);

        let mut table = Self {
            id,
            store,
            detail_type: node.node_type.clone(),
            rows: Vec::new(),
            available,
            search: String::new(),
            sort_by: None,
            pagination: Pagination::new(per_page),
        };
        table.recompute();
        table
    }

    /// Replace the node; switching to another resource type returns to page 1
    pub fn set_node(&mut self, node: &TopologyNode) {
        if node.node_type != self.detail_type {
            self.detail_type = node.node_type.clone();
            self.pagination.page = 1;
        }
        self.available = build_rows(node);
        self.recompute();
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.pagination.page = 1;
        self.recompute();
    }

    pub fn clear_search(&mut self) {
        self.set_search(String::new());
    }

    pub fn sort(&mut self, column: Column, direction: SortDirection) {
        self.sort_by = Some(SortBy { column, direction });
        self.recompute();
    }

    /// Sort by `column`, flipping the direction if it is already the sort column
    pub fn toggle_sort(&mut self, column: Column) {
        let direction = match self.sort_by {
            Some(current) if current.column == column => current.direction.toggled(),
            _ => SortDirection::Asc,
        };
        self.sort(column, direction);
    }

    /// Drop the column sort and return to status priority order
    pub fn clear_sort(&mut self) {
        self.sort_by = None;
        self.recompute();
    }

    pub fn set_page(&mut self, page: usize) {
        self.pagination.set_page(page, self.rows.len());
    }

    pub fn next_page(&mut self) {
        self.pagination.next_page(self.rows.len());
    }

    pub fn prev_page(&mut self) {
        self.pagination.prev_page(self.rows.len());
    }

    /// Change the page size, return to page 1 and persist the choice
    pub fn set_per_page(&mut self, per_page: usize) -> Result<(), StoreError> {
        self.pagination.set_per_page(per_page);
        self.store
            .set(&page_size_key(&self.id), &self.pagination.per_page.to_string())
    }

    /// Step to the next offered page size
    pub fn cycle_per_page(&mut self) -> Result<(), StoreError> {
        let next = self.pagination.next_page_size();
        self.set_per_page(next)
    }

    fn recompute(&mut self) {
        let mut rows = filter_rows(&self.available, &self.search);
        if let Some(sort) = self.sort_by {
            sort_rows(&mut rows, sort);
        }
        self.rows = rows;
    }

    /// Rows on the current page
    pub fn visible_rows(&self) -> &[ResourceRow] {
        self.pagination.slice(&self.rows)
    }

    /// Row at `index` within the current page
    pub fn visible_row(&self, index: usize) -> Option<&ResourceRow> {
        self.visible_rows().get(index)
    }

    pub fn filtered_count(&self) -> usize {
        self.rows.len()
    }

    pub fn total_count(&self) -> usize {
        self.available.len()
    }

    /// Indicator text such as "3 / 12"
    pub fn results_count(&self) -> String {
        format!("{} / {}", self.filtered_count(), self.total_count())
    }

    /// Item count driving the pager
    pub fn pager_item_count(&self) -> usize {
        self.filtered_count()
    }

    pub fn page(&self) -> usize {
        self.pagination.page
    }

    pub fn per_page(&self) -> usize {
        self.pagination.per_page
    }

    pub fn page_count(&self) -> usize {
        self.pagination.page_count(self.pager_item_count())
    }

    pub fn range_label(&self) -> String {
        self.pagination.range_label(self.pager_item_count())
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn sort_by(&self) -> Option<SortBy> {
        self.sort_by
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn detail_type(&self) -> &ResourceType {
        &self.detail_type
    }

    /// Storage slot the page size is persisted under
    pub fn page_size_key(&self) -> String {
        page_size_key(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use ocmscope_types::{NodeSpecs, Pulse, ResourceRef, ResourceStatus, StatusModel, StatusModels};

    fn node(node_type: ResourceType, resources: Vec<ResourceRef>, clusters: &[&str], replicas: usize) -> TopologyNode {
        TopologyNode {
            id: None,
            name: "app".to_string(),
            namespace: None,
            node_type,
            specs: NodeSpecs {
                resources,
                clusters_names: clusters.iter().map(|c| c.to_string()).collect(),
                replica_count: replicas,
                models: StatusModels::default(),
            },
        }
    }

    fn many_resources(n: usize) -> Vec<ResourceRef> {
        (0..n)
            .map(|i| ResourceRef::new(format!("res-{:02}", i)).with_namespace(format!("ns-{:02}", i)))
            .collect()
    }

    fn table(n: &TopologyNode) -> DetailsTable<MemoryStore> {
        DetailsTable::new("pods", n, MemoryStore::new(), 10)
    }

    #[test]
    fn test_filter_by_unique_namespace() {
        let n = node(ResourceType::Pod, many_resources(5), &["east"], 1);
        let mut t = table(&n);
        t.set_search("ns-03");
        assert_eq!(t.filtered_count(), 1);
        assert_eq!(t.visible_rows()[0].name, "res-03");
        assert_eq!(t.results_count(), "1 / 5");
    }

    #[test]
    fn test_filter_ignores_case() {
        let n = node(ResourceType::Pod, many_resources(3), &["East-1"], 1);
        let mut t = table(&n);
        t.set_search("east");
        assert_eq!(t.filtered_count(), 3);
        t.set_search("RES-01");
        assert_eq!(t.filtered_count(), 1);
    }

    #[test]
    fn test_search_resets_page() {
        let n = node(ResourceType::Pod, many_resources(30), &["east"], 1);
        let mut t = table(&n);
        t.set_page(3);
        assert_eq!(t.page(), 3);
        t.set_search("res");
        assert_eq!(t.page(), 1);
    }

    #[test]
    fn test_page_size_change_resets_page_and_persists() {
        let n = node(ResourceType::Pod, many_resources(30), &["east"], 1);
        let mut t = table(&n);
        t.set_page(2);
        t.set_per_page(20).unwrap();
        assert_eq!(t.page(), 1);
        assert_eq!(t.visible_rows().len(), 20);
        assert_eq!(t.store.get("table-pods-page-size").as_deref(), Some("20"));
    }

    #[test]
    fn test_restores_page_size_on_mount() {
        let n = node(ResourceType::Pod, many_resources(30), &["east"], 1);
        let mut store = MemoryStore::new();
        store.set("table-pods-page-size", "50").unwrap();
        let t = DetailsTable::new("pods", &n, store, 10);
        assert_eq!(t.per_page(), 50);
        assert_eq!(t.visible_rows().len(), 30);
    }

    #[test]
    fn test_pages_slice_rows() {
        let n = node(ResourceType::Pod, many_resources(25), &["east"], 1);
        let mut t = table(&n);
        t.set_page(3);
        let names: Vec<_> = t.visible_rows().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["res-20", "res-21", "res-22", "res-23", "res-24"]);
        assert_eq!(t.page_count(), 3);
        assert_eq!(t.range_label(), "21 - 25 of 25");
    }

    #[test]
    fn test_column_sort_overrides_default_order() {
        let n = node(
            ResourceType::Pod,
            vec![ResourceRef::new("b"), ResourceRef::new("a")],
            &["west", "east"],
            1,
        );
        let mut t = table(&n);
        t.sort(Column::Cluster, SortDirection::Asc);
        let order: Vec<_> = t
            .visible_rows()
            .iter()
            .map(|r| (r.cluster.as_str(), r.name.as_str()))
            .collect();
        // Stable: ties keep the default name order
        assert_eq!(order, vec![("east", "a"), ("east", "b"), ("west", "a"), ("west", "b")]);

        t.toggle_sort(Column::Cluster);
        assert_eq!(t.sort_by().unwrap().direction, SortDirection::Desc);
        assert_eq!(t.visible_rows()[0].cluster, "west");
        assert_eq!(t.visible_rows()[0].name, "a");

        t.clear_sort();
        assert_eq!(t.visible_rows()[0].name, "a");
        assert_eq!(t.visible_rows()[1].name, "a");
    }

    #[test]
    fn test_default_order_puts_failures_first() {
        let mut n = node(
            ResourceType::Pod,
            vec![ResourceRef::new("a"), ResourceRef::new("b"), ResourceRef::new("c")],
            &["east"],
            1,
        );
        let mut model = StatusModel::default();
        model.insert(
            "a-east",
            vec![ResourceStatus {
                pulse: Some(Pulse::Green),
                name: "a".to_string(),
                namespace: None,
            }],
        );
        model.insert(
            "c-east",
            vec![ResourceStatus {
                pulse: Some(Pulse::Red),
                name: "c".to_string(),
                namespace: None,
            }],
        );
        n.specs.models.insert(ResourceType::Pod, model);

        let t = table(&n);
        let pulses: Vec<_> = t.visible_rows().iter().map(|r| (r.name.as_str(), r.pulse)).collect();
        assert_eq!(
            pulses,
            vec![("c", Pulse::Red), ("b", Pulse::Orange), ("a", Pulse::Green)]
        );
    }

    #[test]
    fn test_type_change_resets_page() {
        let pods = node(ResourceType::Pod, many_resources(30), &["east"], 1);
        let mut t = table(&pods);
        t.set_page(2);

        let same_type = node(ResourceType::Pod, many_resources(31), &["east"], 1);
        t.set_node(&same_type);
        assert_eq!(t.page(), 2);

        let services = node(ResourceType::Service, many_resources(30), &["east"], 1);
        t.set_node(&services);
        assert_eq!(t.page(), 1);
        assert_eq!(t.detail_type(), &ResourceType::Service);
    }

    #[test]
    fn test_page_size_key() {
        let n = node(ResourceType::Pod, many_resources(1), &["east"], 1);
        assert_eq!(table(&n).page_size_key(), "table-pods-page-size");
    }
}
