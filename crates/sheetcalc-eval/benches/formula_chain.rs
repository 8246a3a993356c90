use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sheetcalc_common::{CellRef, Reference, Rel};
use sheetcalc_eval::test_workbook::TestWorkbook;
use sheetcalc_eval::{Expr, Formula};
use std::rc::Rc;

/// A1 = 1, A(k+1) = A(k) + 1 down `n` rows.
fn chain(n: u32) -> Rc<TestWorkbook> {
    let wb = TestWorkbook::new().with_cell("Sheet1", 0, 0, 1.0).into_store();
    let above = Reference::Cell(CellRef::new(-1, 0, Rel::ROW | Rel::COL));
    for row in 1..n {
        wb.set_formula(
            "Sheet1",
            row,
            0,
            Formula::new(vec![above.clone()], Expr::binary("+", Expr::Ref(0), Expr::lit(1.0)), None),
        );
    }
    wb
}

fn bench_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("Formula");

    // Chains stay under the default depth limit.
    let sizes = [50u32, 200, 500];

    for n in sizes.iter() {
        // Pulls every dependent formula in on demand from the bottom cell.
        group.bench_with_input(BenchmarkId::new("Chain/Cold", n), n, |b, &n| {
            b.iter_batched(
                || chain(n),
                |wb| wb.exec("Sheet1", black_box(n - 1), 0),
                BatchSize::SmallInput,
            )
        });

        // Every formula already cached.
        let warm = chain(*n);
        warm.exec("Sheet1", n - 1, 0);
        group.bench_with_input(BenchmarkId::new("Chain/Cached", n), n, |b, &n| {
            b.iter(|| warm.exec("Sheet1", black_box(n - 1), 0))
        });

        // SUM over a column of plain values.
        let column: Vec<Vec<_>> = (0..*n).map(|i| vec![(i as f64).into()]).collect();
        let values = TestWorkbook::new().with_range("Sheet1", 0, 0, column).into_store();
        let range = Reference::range(0, 0, *n as i32 - 1, 0);
        group.bench_with_input(BenchmarkId::new("Sum/Column", n), n, |b, _| {
            b.iter(|| values.eval(vec![range.clone()], Expr::call("sum", vec![Expr::Ref(0)])))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_evaluation);
criterion_main!(benches);
