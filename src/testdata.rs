// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Static reference data used by the self tests.

/// Reference values for the expected-collision estimator.
///
/// Exact expectations for distributing `COLL_KEYS[i]` keys uniformly
/// into `2^COLL_BITS[j]` buckets, computed with 768-bit interval
/// arithmetic and rounded to the nearest double. A representative
/// subset of key counts spanning 6..1.5e8.
pub mod collision_ref {
    pub const COLL_KEYS: [u64; 11] = [
        149633745, 33554432, 16777216, 8388608, 4194304, 2097152, 1048576, 1000000, 50643, 16388,
        6,
    ];

    pub const COLL_BITS: [u32; 24] = [
        256, 224, 160, 128, 64, 61, 58, 55, 52, 49, 46, 43, 40, 37, 34, 32, 29, 26, 23, 20, 17,
        14, 12, 8,
    ];

    pub const REAL_COLLISIONS: [[f64; 24]; 11] = [
        /* 149633745 */
        [
            9.66830188511513408e-62, 4.15250404044246501e-52, 7.66001792990870096e-33,
            3.28995264957314909e-23, 6.06889145411344312e-04, 4.85511316319886099e-03,
            3.88409052997096826e-02, 3.10727242021280714e-01, 2.48581791208085123e+00,
            1.98865417549256875e+01, 1.59092235369305229e+02, 1.27273156809446004e+03,
            1.01814484072519826e+04, 8.14257293862626102e+04, 6.49754472522680881e+05,
            2.57656049031511368e+06, 1.90430490019698478e+07, 8.97430373397975862e+07,
            1.41245137150265992e+08, 1.48585169000000000e+08, 1.49502673000000000e+08,
            1.49617361000000000e+08, 1.49629649000000000e+08, 1.49633489000000000e+08,
        ],
        /* 33554432 */
        [
            4.86173054093815170e-63, 2.08809736752937507e-53, 3.85185977398010151e-34,
            1.65436117580224877e-24, 3.05175772154867956e-05, 2.44140617722858139e-04,
            1.95312494171654793e-03, 1.56249995294880754e-02, 1.24999995964268876e-01,
            9.99999950329464760e-01, 7.99999849001593066e+00, 6.39999167125279200e+01,
            5.11994776448079449e+02, 4.09566656497021177e+03, 3.27466761046086358e+04,
            1.30731328417170167e+05, 1.02706774802737299e+06, 7.14915140285272896e+06,
            2.53194666782758720e+07, 3.25058560000000149e+07, 3.34233600000000000e+07,
            3.35380480000000000e+07, 3.35503360000000000e+07, 3.35541760000000000e+07,
        ],
        /* 16777216 */
        [
            1.21543259901182161e-63, 5.22024326324805573e-54, 9.62964914796432828e-35,
            4.13590281624610549e-25, 7.62939407650033587e-06, 6.10351526118731654e-05,
            4.88281220886695622e-04, 3.90624976656302669e-03, 3.12499980985497493e-02,
            2.49999982615312394e-01, 1.99999972184502894e+00, 1.59999888738063110e+01,
            1.27999341331538730e+02, 1.02395827357716189e+03, 8.18933349644321879e+03,
            3.27253730219586105e+04, 2.59434518880420335e+05, 1.93278773688231292e+06,
            9.52388250430562906e+06, 1.57286401180007830e+07, 1.66461440000000000e+07,
            1.67608320000000000e+07, 1.67731200000000000e+07, 1.67769600000000000e+07,
        ],
        /* 8388608 */
        [
            3.03858131641597245e-64, 1.30506073802432296e-54, 2.40741214349811932e-35,
            1.03397564243176815e-25, 1.90734840543853551e-06, 1.52587872434920922e-05,
            1.22070297946900538e-04, 9.76562383508887020e-04, 7.81249906382678900e-03,
            6.24999922389786536e-02, 4.99999920527147979e-01, 3.99999825159784450e+00,
            3.19999148052787241e+01, 2.55994761230423023e+02, 2.04766646333135259e+03,
            8.18666829515939844e+03, 6.51959881527814287e+04, 5.03108560814804456e+05,
            3.08599623930656072e+06, 7.34038375671866629e+06, 8.25753600000000000e+06,
            8.37222400000000000e+06, 8.38451200000000000e+06, 8.38835200000000000e+06,
        ],
        /* 4194304 */
        [
            7.59645238547202323e-65, 3.26265145612235253e-55, 6.01852964128048457e-36,
            2.58493879793062928e-26, 4.76837044516251121e-07, 3.81469635612798540e-06,
            3.05175708488943550e-05, 2.44140566782865192e-04, 1.95312453373238325e-03,
            1.56249962359046226e-02, 1.24999967714152560e-01, 9.99999602635834095e-01,
            7.99998792014230276e+00, 6.39993337049769480e+01, 5.11958213835826825e+02,
            2.04733300825732044e+03, 1.63414126607763610e+04, 1.28383442816345399e+05,
            8.93643792677999707e+05, 3.16493330273212725e+06, 4.06323200000000186e+06,
            4.17792000000000000e+06, 4.19020800000000000e+06, 4.19404800000000000e+06,
        ],
        /* 2097152 */
        [
            1.89911264358405187e-65, 8.15662669561360700e-56, 1.50463205158771428e-36,
            6.46234545408261769e-27, 1.19209232707357876e-07, 9.53673861658609958e-07,
            7.62939089325268947e-06, 6.10351271449853099e-05, 4.88281017093565247e-04,
            3.90624813250421915e-03, 3.12499847883983932e-02, 2.49999860922525130e-01,
            1.99999777476235363e+00, 1.59999109908239898e+01, 1.27994730797902378e+02,
            5.11916432816754536e+02, 4.09066992542314756e+03, 3.24293016088167678e+04,
            2.41598381928946561e+05, 1.19048519461980974e+06, 1.96608001474931021e+06,
            2.08076800000000000e+06, 2.09305600000000000e+06, 2.09689600000000000e+06,
        ],
        /* 1048576 */
        [
            4.74777934504035996e-66, 2.03915570155726458e-56, 3.76157833530725135e-37,
            1.61558559314867667e-27, 2.98022939659853163e-08, 2.38418351727850926e-07,
            1.90734681382078342e-06, 1.52587745104367425e-05, 1.22070196075204293e-04,
            9.76561568071097354e-04, 7.81249251061440653e-03, 6.24999379118355361e-02,
            4.99999364217615039e-01, 3.99998601282519894e+00, 3.19993184525517833e+01,
            1.27989461928571330e+02, 1.02333268407003743e+03, 8.14949178914149161e+03,
            6.28885218402970859e+04, 3.85749368965992646e+05, 9.17547968415727606e+05,
            1.03219200000000000e+06, 1.04448000000000000e+06, 1.04832000000000000e+06,
        ],
        /* 1000000 */
        [
            4.31807995946294477e-66, 1.85460122074063535e-56, 3.42113540777918151e-37,
            1.46936646915992086e-27, 2.71050272070828090e-08, 2.16840217656635049e-07,
            1.73472174125132492e-06, 1.38777739298982540e-05, 1.11022191431995915e-04,
            8.88177530995799824e-04, 7.10542021851567982e-03, 5.68433598632794995e-02,
            4.54746758276122764e-01, 3.63796634589555756e+00, 2.91032366741829662e+01,
            1.16406170946493603e+02, 9.30743673031597268e+02, 7.41370327597679898e+03,
            5.73050521340394553e+04, 3.55463869940310891e+05, 8.68991693239986780e+05,
            9.83616000000000000e+05, 9.95904000000000000e+05, 9.99744000000000000e+05,
        ],
        /* 50643 */
        [
            1.10744301397987420e-68, 4.75643152722723048e-59, 8.77406750868841857e-40,
            3.76843330027129536e-30, 6.95153246489491803e-11, 5.56122597191589927e-10,
            4.44898077753249111e-09, 3.55918462202453374e-08, 2.84734769761028846e-07,
            2.27787815802846539e-06, 1.82230252604027392e-05, 1.45784201838422859e-04,
            1.16627359904024406e-03, 9.33018778962516233e-03, 7.46414381444532316e-02,
            2.98564872499666734e-01, 2.38845326899687205e+00, 1.91034214287983026e+01,
            1.52558668462478067e+02, 1.20347485170217601e+03, 8.63630719761463843e+03,
            3.50036860916488222e+04, 4.65470174614963616e+04, 5.03870000000000000e+04,
        ],
        /* 16388 */
        [
            1.15962220635645385e-69, 4.98053945201633260e-60, 9.18747366203589011e-41,
            3.94598989113055048e-31, 7.27906656391302647e-12, 5.82325325113040825e-11,
            4.65860260090425009e-10, 3.72688208072290542e-09, 2.98150566457516053e-08,
            2.38520453163987852e-07, 1.90816362518230592e-06, 1.52653089931642262e-05,
            1.22122471414483764e-04, 9.76979737342747187e-04, 7.81583572446263239e-03,
            3.12633130791898986e-02, 2.50104278189982043e-01, 2.00069174169475472e+00,
            1.59964193504148877e+01, 1.27390257914498051e+02, 9.83048913714464220e+02,
            6.02968148160985038e+03, 1.23669110286182531e+04, 1.61320000000000000e+04,
        ],
        /* 6 */
        [
            1.29542528326416669e-76, 5.56380922603113208e-67, 1.02634164867540313e-47,
            4.40810381558357815e-38, 8.13151629364128326e-19, 6.50521303491302660e-18,
            5.20417042793042128e-17, 4.16333634234433703e-16, 3.33066907387546883e-15,
            2.66453525910036939e-14, 2.13162820728026017e-13, 1.70530256582398195e-12,
            1.36424205265773800e-11, 1.09139364211692597e-10, 8.73114913634248473e-10,
            3.49245965372384226e-09, 2.79396771690754164e-08, 2.23517413466822798e-07,
            1.78813905904464986e-06, 1.43050965562127250e-05, 1.14439753822193055e-04,
            9.15452841354552627e-04, 3.66091750036190520e-03, 5.82894668923472636e-02,
        ],
    ];
}

/// Fixed seeds for driver self tests, so failures reproduce.
pub mod seeds {
    pub const STATIC_TEST_SEEDS: [u64; 4] = [
        0x0a8c_7d8f_11d3_99d5,
        0xc442_97a9_41b6_2cf8,
        0x6e1f_90ea_b8d6_3d7c,
        0x23f1_9a5d_0e44_8b09,
    ];
}
