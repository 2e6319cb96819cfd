#[macro_export]
macro_rules! ensure_eq {
    ($expr1: expr, $expr2: expr) => {
        if $expr1 != $expr2 {
            return Err($crate::SolverError::DimensionMismatch {
                left: format!("{} = {:?}", stringify!($expr1), $expr1),
                right: format!("{} = {:?}", stringify!($expr2), $expr2),
            });
        }
    };
}
