quantity!(Knots, "kn", precision: 1);
