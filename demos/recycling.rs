// Example: steady-state scrolling reuses pooled views instead of allocating.
use retable::{IndexPath, ReusableView, ReusePool, Table, TableDataSource, Viewport};

struct Cell {
    title: String,
}

impl ReusableView for Cell {
    fn reuse_identifier(&self) -> &str {
        "cell"
    }

    fn prepare_for_reuse(&mut self) {
        self.title.clear();
    }
}

struct Feed {
    created: usize,
}

impl TableDataSource<Cell> for Feed {
    fn number_of_rows_in_section(&mut self, _section: usize) -> usize {
        100_000
    }

    fn cell_for_row(&mut self, pool: &mut ReusePool<Cell>, path: IndexPath) -> Cell {
        let mut cell = pool.dequeue("cell").unwrap_or_else(|| {
            self.created += 1;
            Cell {
                title: String::new(),
            }
        });
        cell.title = format!("item {}", path.row);
        cell
    }
}

fn main() {
    let mut source = Feed { created: 0 };

    // Default delegate: 42-point rows, no headers or footers.
    let mut table: Table<Cell> = Table::new();
    table.set_overscan(2);
    table.apply_scroll_frame(Viewport::new(320.0, 480.0), 0.0);
    table.reload_data(&mut source, &mut ()).unwrap();

    for step in 0..1_000u64 {
        table.set_scroll_offset_clamped((step * 37) as f64);
        table.layout_visible(&mut source, &mut ());
    }

    println!("rows={}", table.number_of_rows());
    println!("bound={}", table.visible_count());
    println!("pooled={}", table.pool().pooled_count());
    println!("views ever created={}", source.created);
}
