macro_rules! primitive_kinds {
    (
        $( $variant:ident => $name:literal $( | $alias:literal )* ),* $(,)?
    ) => {
        /// Scalar types the runtime knows natively.
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
        pub enum PrimitiveKind {
            $( $variant, )*
        }

        impl PrimitiveKind {
            pub const ALL: &'static [PrimitiveKind] = &[ $( PrimitiveKind::$variant, )* ];

            /// The simple name, e.g. `Int32`.
            pub fn name(&self) -> &'static str {
                match self {
                    $( PrimitiveKind::$variant => $name, )*
                }
            }

            /// The namespaced name, e.g. `System.Int32`.
            pub fn full_name(&self) -> String {
                format!("System.{}", self.name())
            }

            /// Every lowercase shorthand accepted for this kind.
            pub fn aliases(&self) -> &'static [&'static str] {
                match self {
                    $( PrimitiveKind::$variant => &[ $( $alias, )* ], )*
                }
            }
        }
    };
}
