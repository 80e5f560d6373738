// Example: minimal usage — reload, visible range, scroll-to.
use retable::{
    IndexPath, ReusableView, ReusePool, ScrollPosition, Table, TableDataSource, TableDelegate,
    Viewport,
};

struct Label {
    text: String,
}

impl ReusableView for Label {
    fn reuse_identifier(&self) -> &str {
        "label"
    }

    fn prepare_for_reuse(&mut self) {
        self.text.clear();
    }
}

struct Numbers;

impl TableDataSource<Label> for Numbers {
    fn number_of_sections(&mut self) -> usize {
        4
    }

    fn number_of_rows_in_section(&mut self, _section: usize) -> usize {
        250
    }

    fn cell_for_row(&mut self, pool: &mut ReusePool<Label>, path: IndexPath) -> Label {
        let mut label = pool
            .dequeue("label")
            .unwrap_or_else(|| Label { text: String::new() });
        label.text = format!("row {}.{}", path.section, path.row);
        label
    }
}

struct Uniform;

impl TableDelegate<Label> for Uniform {
    fn height_for_row(&mut self, _path: IndexPath) -> f64 {
        24.0
    }

    fn height_for_header_in_section(&mut self, _section: usize) -> f64 {
        30.0
    }
}

fn main() {
    let mut source = Numbers;
    let mut delegate = Uniform;

    let mut table: Table<Label> = Table::new();
    table.set_viewport(Viewport::new(320.0, 240.0));
    table.reload_data(&mut source, &mut delegate).unwrap();

    println!("total_height={}", table.total_height());
    println!("visible_range={:?}", table.visible_range());

    let offset = table
        .scroll_to_row(IndexPath::new(3, 249), ScrollPosition::Bottom)
        .unwrap();
    table.layout_visible(&mut source, &mut delegate);
    println!("after scroll_to_row: offset={offset}");
    table.for_each_visible_region(|region, rect, view| {
        println!("{region:?} at y={}: {:?}", rect.y, view.text);
    });
}
