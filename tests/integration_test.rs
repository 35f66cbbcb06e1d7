use anyhow::Result;
use std::collections::HashSet;
use std::env;
use std::fs;

use dashgrid::{
    charts_in_scope, convert_to_layout, convert_to_positions, generate_virtual_grid,
    layout_to_json, load_layout, parse_positions, save_layout, scope_from_checked,
    scope_nodes_tree, serialize_filter_scopes, ChartPosition, DashboardFilter, FilterScope,
    LayoutNode, LayoutTree, NodeType, Rectangle, VirtualGridConfig, GRID_ID,
};

fn rect(row: i64, col: i64, size_x: i64, size_y: i64, slice_id: &str) -> Rectangle {
    Rectangle {
        row,
        col,
        size_x,
        size_y,
        slice_id: slice_id.to_string(),
    }
}

fn chart_ids_in_order(tree: &LayoutTree, container_id: &str) -> Vec<i64> {
    tree.get(container_id)
        .unwrap()
        .children
        .iter()
        .filter_map(|id| tree.get(id).and_then(|n| n.meta.chart_id))
        .collect()
}

#[test]
fn test_single_chart_dashboard() -> Result<()> {
    let rects = parse_positions(
        r#"[{"col": 1, "row": 0, "size_x": 16, "size_y": 16, "slice_id": "240"}]"#,
    )?;
    let tree = convert_to_layout(&rects)?;
    tree.validate()?;

    // Root, grid, one wrapping row, one chart.
    assert_eq!(tree.len(), 4);
    let grid = tree.get(GRID_ID).unwrap();
    let row = tree.get(&grid.children[0]).unwrap();
    assert_eq!(row.node_type, NodeType::Row);
    let chart = tree.get(&row.children[0]).unwrap();
    assert_eq!(chart.node_type, NodeType::Chart);
    assert_eq!(chart.meta.width, 4);
    assert_eq!(chart.meta.height, 25);

    let positions = convert_to_positions(&tree)?;
    assert_eq!(
        positions[&240],
        ChartPosition {
            row: 1,
            col: 1,
            row_span: 13,
            col_span: 4
        }
    );
    Ok(())
}

#[test]
fn test_flat_three_chart_dashboard() -> Result<()> {
    // Three 16x16 charts side by side, given out of column order.
    let rects = vec![
        rect(0, 17, 16, 16, "117"),
        rect(0, 1, 16, 16, "118"),
        rect(0, 33, 16, 16, "119"),
    ];
    let tree = convert_to_layout(&rects)?;
    tree.validate()?;

    let grid = tree.get(GRID_ID).unwrap();
    assert_eq!(grid.children.len(), 1);
    assert_eq!(chart_ids_in_order(&tree, &grid.children[0]), vec![118, 117, 119]);

    let positions = convert_to_positions(&tree)?;
    assert_eq!(positions[&118].col, 1);
    assert_eq!(positions[&117].col, 5);
    assert_eq!(positions[&119].col, 9);
    Ok(())
}

#[test]
fn test_stacked_rows_dashboard() -> Result<()> {
    // A full-width chart below two side-by-side charts.
    let rects = vec![
        rect(12, 1, 48, 12, "38"),
        rect(0, 1, 16, 12, "42"),
        rect(0, 17, 32, 12, "98"),
    ];
    let tree = convert_to_layout(&rects)?;
    tree.validate()?;

    let grid = tree.get(GRID_ID).unwrap();
    assert_eq!(grid.children.len(), 2);
    assert_eq!(chart_ids_in_order(&tree, &grid.children[0]), vec![42, 98]);
    assert_eq!(chart_ids_in_order(&tree, &grid.children[1]), vec![38]);

    let positions = convert_to_positions(&tree)?;
    assert_eq!(positions[&42].row, 1);
    assert_eq!(positions[&98].col, 5);
    assert_eq!(positions[&38].row, 11);
    Ok(())
}

#[test]
fn test_nested_column_dashboard() -> Result<()> {
    // A tall chart beside two vertically stacked ones: the band cannot be
    // emitted flat and nests columns inside the row.
    let rects = vec![
        rect(0, 14, 28, 22, "38"),
        rect(0, 1, 13, 8, "42"),
        rect(8, 1, 13, 14, "98"),
    ];
    let tree = convert_to_layout(&rects)?;
    tree.validate()?;
    assert_eq!(tree.len(), 8);

    let grid = tree.get(GRID_ID).unwrap();
    let row = tree.get(&grid.children[0]).unwrap();
    assert_eq!(row.children.len(), 2);
    let left = tree.get(&row.children[0]).unwrap();
    let right = tree.get(&row.children[1]).unwrap();
    assert_eq!(left.node_type, NodeType::Column);
    assert_eq!(right.node_type, NodeType::Column);
    assert_eq!(chart_ids_in_order(&tree, &left.id), vec![42, 98]);
    assert_eq!(chart_ids_in_order(&tree, &right.id), vec![38]);

    let positions = convert_to_positions(&tree)?;
    assert_eq!(positions[&98].row, 8);
    assert_eq!(positions[&38].col, 4);
    Ok(())
}

#[test]
fn test_three_column_dashboard() -> Result<()> {
    // Left column of three stacked charts next to two tall charts.
    let rects = vec![
        rect(8, 1, 16, 9, "45"),
        rect(0, 17, 16, 17, "51"),
        rect(0, 33, 16, 17, "57"),
        rect(4, 1, 16, 4, "293"),
        rect(0, 1, 16, 4, "294"),
    ];
    let tree = convert_to_layout(&rects)?;
    tree.validate()?;

    let grid = tree.get(GRID_ID).unwrap();
    assert_eq!(grid.children.len(), 1);
    let row = tree.get(&grid.children[0]).unwrap();
    assert_eq!(row.children.len(), 3);
    let first = tree.get(&row.children[0]).unwrap();
    assert_eq!(chart_ids_in_order(&tree, &first.id), vec![294, 293, 45]);
    assert_eq!(first.meta.height, 6 + 6 + 13);
    assert_eq!(row.meta.width, 12);

    let positions = convert_to_positions(&tree)?;
    assert_eq!(positions[&294].row, 1);
    assert_eq!(positions[&293].row, 5);
    assert_eq!(positions[&45].row, 9);
    assert_eq!(positions[&51].col, 5);
    assert_eq!(positions[&57].col, 9);
    Ok(())
}

#[test]
fn test_layout_json_pipeline() -> Result<()> {
    let rects = generate_virtual_grid(&VirtualGridConfig::default());
    let tree = convert_to_layout(&rects)?;
    let positions = convert_to_positions(&tree)?;

    let path = env::temp_dir().join("dashgrid_pipeline_test.json");
    save_layout(&path, &tree)?;
    let loaded = load_layout(&path)?;
    let _ = fs::remove_file(&path);

    loaded.validate()?;
    assert_eq!(
        tree.ids().collect::<Vec<_>>(),
        loaded.ids().collect::<Vec<_>>()
    );
    assert_eq!(convert_to_positions(&loaded)?, positions);

    // Serialized form is stable across conversions of the same input.
    assert_eq!(layout_to_json(&tree)?, layout_to_json(&convert_to_layout(&rects)?)?);
    Ok(())
}

/// Root -> Grid -> [Tab t1(Row(A=101, B=102)), Tab t2(C=103)]
fn tabbed_tree() -> LayoutTree {
    let mut tree = LayoutTree::with_skeleton();

    let mut tab1 = LayoutNode::new("TAB-1", NodeType::Tab);
    tab1.meta.text = Some("Overview".to_string());
    tab1.children = vec!["ROW-1".to_string()];
    tree.insert(tab1);

    let mut row = LayoutNode::new("ROW-1", NodeType::Row);
    row.children = vec!["CHART-1".to_string(), "CHART-2".to_string()];
    row.meta.width = 8;
    row.meta.height = 25;
    tree.insert(row);

    let mut a = LayoutNode::new("CHART-1", NodeType::Chart);
    a.meta.chart_id = Some(101);
    a.meta.width = 4;
    a.meta.height = 25;
    tree.insert(a);
    let mut b = LayoutNode::new("CHART-2", NodeType::Chart);
    b.meta.chart_id = Some(102);
    b.meta.width = 4;
    b.meta.height = 25;
    tree.insert(b);

    let mut tab2 = LayoutNode::new("TAB-2", NodeType::Tab);
    tab2.children = vec!["CHART-3".to_string()];
    tree.insert(tab2);
    let mut c = LayoutNode::new("CHART-3", NodeType::Chart);
    c.meta.chart_id = Some(103);
    c.meta.width = 4;
    c.meta.height = 25;
    tree.insert(c);

    let grid = tree.get_mut(GRID_ID).unwrap();
    grid.children = vec!["TAB-1".to_string(), "TAB-2".to_string()];
    tree.validate().unwrap();
    tree
}

#[test]
fn test_scope_selection_round_trip() -> Result<()> {
    let tree = tabbed_tree();
    let no_filters = HashSet::new();

    let nodes = scope_nodes_tree(&tree, &no_filters)?;
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].children.len(), 2);
    assert_eq!(nodes[0].children[0].label, "Overview");

    let tab1_scope = FilterScope {
        scope: vec!["TAB-1".to_string()],
        immune: vec![],
    };
    assert_eq!(charts_in_scope(&tree, &tab1_scope, -1)?, vec![101, 102]);

    let tab1_immune = FilterScope {
        scope: vec!["TAB-1".to_string()],
        immune: vec![101],
    };
    assert_eq!(charts_in_scope(&tree, &tab1_immune, -1)?, vec![102]);

    // Every checkbox-reachable selection survives collapse -> expand.
    let selections: [&[i64]; 5] = [&[101, 102, 103], &[101, 102], &[102, 103], &[103], &[]];
    for checked in selections {
        let collapsed = scope_from_checked(&tree, checked, &no_filters)?;
        let mut expanded = charts_in_scope(&tree, &collapsed, -1)?;
        expanded.sort_unstable();
        let mut expected = checked.to_vec();
        expected.sort_unstable();
        assert_eq!(expanded, expected, "round trip failed for {checked:?}");
    }
    Ok(())
}

#[test]
fn test_filter_never_applies_to_itself() -> Result<()> {
    let tree = tabbed_tree();
    let scope = FilterScope::dashboard_wide();
    // Chart 102 hosts the filter; it is excluded from its own scope.
    assert_eq!(charts_in_scope(&tree, &scope, 102)?, vec![101, 103]);
    Ok(())
}

#[test]
fn test_persisted_filter_scope_shape() -> Result<()> {
    let tree = tabbed_tree();
    let no_filters = HashSet::new();
    let edited = scope_from_checked(&tree, &[101, 102], &no_filters)?;

    let filters = vec![DashboardFilter {
        chart_id: 103,
        columns: vec!["region".to_string()],
        scopes: [("region".to_string(), edited)].into_iter().collect(),
    }];
    let persisted = serialize_filter_scopes(&filters);

    let json = serde_json::to_value(&persisted)?;
    assert_eq!(json["103"]["region"]["scope"], serde_json::json!(["TAB-1"]));
    assert_eq!(json["103"]["region"]["immune"], serde_json::json!([]));
    Ok(())
}
